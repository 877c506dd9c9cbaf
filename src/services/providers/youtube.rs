/// YouTube Data API v3 provider
///
/// Resolves a search query into video descriptors via the `search.list`
/// endpoint. Unlike the generation path, every failure here degrades to an
/// empty result: a missing key, a transport error, or a malformed body all
/// look like "no videos found" to the caller.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Video,
    services::providers::VideoSearchProvider,
};

#[derive(Clone)]
pub struct YouTubeProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

impl YouTubeProvider {
    pub fn new(api_key: Option<String>, api_url: String) -> Self {
        if api_key.is_none() {
            tracing::warn!(
                provider = "youtube",
                "No API key configured, video search disabled"
            );
        }

        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    async fn search_videos(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> AppResult<Vec<Video>> {
        let url = format!("{}/search", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("q", query),
                ("part", "id,snippet"),
                ("type", "video"),
                ("maxResults", &max_results.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "YouTube API returned status {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await?;

        let videos = search
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(Video {
                    url: canonical_url(&video_id),
                    title: item.snippet.title,
                    video_id,
                })
            })
            .collect();

        Ok(videos)
    }
}

#[async_trait::async_trait]
impl VideoSearchProvider for YouTubeProvider {
    async fn search(&self, query: &str, max_results: u32) -> Vec<Video> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };

        match self.search_videos(api_key, query, max_results).await {
            Ok(videos) => {
                tracing::info!(
                    query = %query,
                    results = videos.len(),
                    provider = "youtube",
                    "Video search completed"
                );
                videos
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    query = %query,
                    provider = "youtube",
                    "Video search failed, returning empty results"
                );
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

/// Provider-stable watch link for a video id
pub fn canonical_url(video_id: &str) -> String {
    format!("https://youtu.be/{}", video_id)
}

/// Extracts a video id from a `youtu.be/...` or `watch?v=...` URL.
///
/// Returns `None` when the text carries neither form, so bare ids pass
/// through callers untouched.
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some(rest) = url.split("youtu.be/").nth(1) {
        let id = rest.split(['?', '&']).next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    if let Some(rest) = url.split("v=").nth(1) {
        let id = rest.split('&').next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    None
}
