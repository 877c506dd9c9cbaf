use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{Feedback, ItemKind, ItemMetadata, LikedItem, Video};
use crate::services::providers::youtube;

use super::AppState;

/// Videos fetched per discover request
const DEFAULT_MAX_RESULTS: u32 = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub suggestions: Vec<String>,
    pub videos: Vec<Video>,
    pub liked: Vec<LikedItem>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoSearchQuery {
    q: String,
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub key: String,
    pub kind: ItemKind,
    pub feedback: Feedback,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearFeedbackRequest {
    pub key: String,
    pub kind: ItemKind,
}

#[derive(Debug, Serialize)]
pub struct LikedResponse {
    pub liked: Vec<LikedItem>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// One full discovery cycle: generate suggestions for the input, search
/// for videos, and return the current liked list.
///
/// Re-submitting the input last processed for this session reuses the
/// session's suggestions instead of regenerating them. The liked list is
/// read fresh from the store on every call.
pub async fn discover(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<DiscoverRequest>,
) -> AppResult<Json<DiscoverResponse>> {
    let input = request.input;

    if input.trim().is_empty() {
        let mut session = state.session.write().await;
        session.suggestions.clear();
        drop(session);

        let liked = state.store.list_liked().await?;
        return Ok(Json(DiscoverResponse {
            suggestions: Vec::new(),
            videos: Vec::new(),
            liked,
        }));
    }

    let suggestions = {
        let mut session = state.session.write().await;
        if session.last_input.as_deref() != Some(input.as_str()) {
            let generated = state.suggestions.generate(&input).await?;

            tracing::info!(
                request_id = %request_id,
                input = %input,
                suggestions = generated.len(),
                "Generated suggestions for new input"
            );

            session.last_input = Some(input.clone());
            session.suggestions = generated;
        }
        session.suggestions.clone()
    };

    let videos = state.video_search.search(&input, DEFAULT_MAX_RESULTS).await;
    let liked = state.store.list_liked().await?;

    Ok(Json(DiscoverResponse {
        suggestions,
        videos,
        liked,
    }))
}

/// Generate search queries for the given input (cache-fronted)
pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsQuery>,
) -> AppResult<Json<Vec<String>>> {
    let suggestions = state.suggestions.generate(&params.q).await?;
    Ok(Json(suggestions))
}

/// Search for videos matching the query
pub async fn search_videos(
    State(state): State<AppState>,
    Query(params): Query<VideoSearchQuery>,
) -> Json<Vec<Video>> {
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let videos = state.video_search.search(&params.q, max_results).await;
    Json(videos)
}

/// Record like/dislike feedback, then return the fresh liked list
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> AppResult<Json<LikedResponse>> {
    let key = normalized_key(&request.key, request.kind)?;

    let metadata = ItemMetadata {
        title: request.title.unwrap_or_default(),
        url: request.url.unwrap_or_default(),
    };

    state
        .store
        .upsert(&key, request.kind, request.feedback, &metadata)
        .await?;

    let liked = state.store.list_liked().await?;
    Ok(Json(LikedResponse { liked }))
}

/// Clear feedback for an item, then return the fresh liked list
pub async fn clear_feedback(
    State(state): State<AppState>,
    Json(request): Json<ClearFeedbackRequest>,
) -> AppResult<Json<LikedResponse>> {
    let key = normalized_key(&request.key, request.kind)?;

    state.store.clear(&key, request.kind).await?;

    let liked = state.store.list_liked().await?;
    Ok(Json(LikedResponse { liked }))
}

/// Current liked items, videos first, each group newest-first
pub async fn get_liked(State(state): State<AppState>) -> AppResult<Json<LikedResponse>> {
    let liked = state.store.list_liked().await?;
    Ok(Json(LikedResponse { liked }))
}

/// Video feedback keys may arrive as watch URLs; reduce them to the bare
/// video id so the store key stays canonical.
fn normalized_key(key: &str, kind: ItemKind) -> AppResult<String> {
    if key.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Feedback key cannot be empty".to_string(),
        ));
    }

    let key = match kind {
        ItemKind::Video => youtube::extract_video_id(key).unwrap_or_else(|| key.to_string()),
        ItemKind::Query => key.to_string(),
    };

    Ok(key)
}
