/// DeepSeek chat-completions provider
///
/// Turns a free-text craving into up to [`MAX_QUERIES`] YouTube search
/// queries with a single chat request. The response body is expected to be
/// newline-delimited query text in the first choice's message content.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    services::providers::QueryGenerator,
};

/// Hard timeout on the outbound call; a timeout is reported like any other
/// transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of queries taken from a response
pub const MAX_QUERIES: usize = 5;

const MODEL: &str = "deepseek-chat";
const TEMPERATURE: f64 = 0.7;

#[derive(Clone)]
pub struct DeepseekGenerator {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl DeepseekGenerator {
    pub fn new(api_key: Option<String>, api_url: String) -> AppResult<Self> {
        if api_key.is_none() {
            tracing::warn!(
                provider = "deepseek",
                "No API key configured, query generation disabled"
            );
        }

        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }
}

#[async_trait::async_trait]
impl QueryGenerator for DeepseekGenerator {
    async fn generate_queries(&self, input: &str) -> AppResult<Vec<String>> {
        let Some(api_key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let url = format!("{}/v1/chat/completions", self.api_url);
        let prompt = format!(
            "Generate 5 specific YouTube search queries about: {}. Return ONLY the queries, one per line.",
            input
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": MODEL,
                "messages": [{
                    "role": "user",
                    "content": prompt,
                }],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "DeepSeek API returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Invalid DeepSeek response: {}", e)))?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                AppError::Generation("DeepSeek response contained no choices".to_string())
            })?;

        let queries = parse_queries(content);

        tracing::info!(
            input = %input,
            queries = queries.len(),
            provider = "deepseek",
            "Query generation completed"
        );

        Ok(queries)
    }

    fn name(&self) -> &'static str {
        "deepseek"
    }
}

/// Splits newline-delimited message content into at most [`MAX_QUERIES`]
/// trimmed, non-blank queries, preserving provider order.
fn parse_queries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_QUERIES)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries_five_lines_in_order() {
        let content = "cat grooming tips\ncat diet basics\nfunny cat compilations\ncat training 101\ncat breeds explained";
        let queries = parse_queries(content);

        assert_eq!(
            queries,
            vec![
                "cat grooming tips",
                "cat diet basics",
                "funny cat compilations",
                "cat training 101",
                "cat breeds explained",
            ]
        );
    }

    #[test]
    fn test_parse_queries_strips_whitespace_and_blank_lines() {
        let content = "  first query  \n\n   \nsecond query\n";
        assert_eq!(parse_queries(content), vec!["first query", "second query"]);
    }

    #[test]
    fn test_parse_queries_truncates_to_five() {
        let content = "a\nb\nc\nd\ne\nf\ng";
        assert_eq!(parse_queries(content), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_parse_queries_empty_content() {
        assert!(parse_queries("").is_empty());
        assert!(parse_queries("\n\n  \n").is_empty());
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "query one\nquery two"
                }
            }]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "query one\nquery two");
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_empty_without_calling_out() {
        // api_url is unroutable on purpose: with no key configured, the
        // generator must not attempt the request at all.
        let generator =
            DeepseekGenerator::new(None, "http://127.0.0.1:1".to_string()).unwrap();

        let queries = generator.generate_queries("cats").await.unwrap();
        assert!(queries.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_provider_surfaces_generation_error() {
        let generator = DeepseekGenerator::new(
            Some("test-key".to_string()),
            "http://127.0.0.1:1".to_string(),
        )
        .unwrap();

        let err = generator.generate_queries("cats").await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }
}
