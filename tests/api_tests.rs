use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use crave_api::api::{create_router, AppState};
use crave_api::db::{create_memory_pool, init_schema, FeedbackStore};
use crave_api::error::{AppError, AppResult};
use crave_api::models::Video;
use crave_api::services::providers::{QueryGenerator, VideoSearchProvider};
use crave_api::services::SuggestionService;

/// Generator stub that counts provider calls
struct StubGenerator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait::async_trait]
impl QueryGenerator for StubGenerator {
    async fn generate_queries(&self, input: &str) -> AppResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Generation("provider down".to_string()));
        }
        Ok((1..=5).map(|i| format!("{} query {}", input, i)).collect())
    }

    fn name(&self) -> &'static str {
        "stub-generator"
    }
}

/// Video search stub returning a fixed result set
struct StubVideoProvider {
    videos: Vec<Video>,
}

#[async_trait::async_trait]
impl VideoSearchProvider for StubVideoProvider {
    async fn search(&self, _query: &str, max_results: u32) -> Vec<Video> {
        self.videos
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect()
    }

    fn name(&self) -> &'static str {
        "stub-videos"
    }
}

fn stub_videos() -> Vec<Video> {
    vec![
        Video {
            video_id: "vid1".to_string(),
            title: "First video".to_string(),
            url: "https://youtu.be/vid1".to_string(),
        },
        Video {
            video_id: "vid2".to_string(),
            title: "Second video".to_string(),
            url: "https://youtu.be/vid2".to_string(),
        },
    ]
}

async fn create_test_server_with(fail_generation: bool) -> (TestServer, Arc<AtomicUsize>) {
    let pool = create_memory_pool().await.unwrap();
    init_schema(&pool).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let generator = StubGenerator {
        calls: calls.clone(),
        fail: fail_generation,
    };

    let state = AppState::new(
        FeedbackStore::new(pool),
        SuggestionService::new(Arc::new(generator)),
        Arc::new(StubVideoProvider {
            videos: stub_videos(),
        }),
    );

    let server = TestServer::new(create_router(state)).unwrap();
    (server, calls)
}

async fn create_test_server() -> (TestServer, Arc<AtomicUsize>) {
    create_test_server_with(false).await
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_like_then_clear_query_feedback() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/api/v1/feedback")
        .json(&json!({
            "key": "cats",
            "kind": "query",
            "feedback": "like"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body["liked"],
        json!([{ "type": "query", "query": "cats" }])
    );

    let response = server
        .delete("/api/v1/feedback")
        .json(&json!({
            "key": "cats",
            "kind": "query"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["liked"], json!([]));
}

#[tokio::test]
async fn test_video_feedback_normalizes_url_keys() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/api/v1/feedback")
        .json(&json!({
            "key": "https://youtu.be/vid1",
            "kind": "video",
            "feedback": "like",
            "title": "First video",
            "url": "https://youtu.be/vid1"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["liked"][0]["type"], "video");
    assert_eq!(body["liked"][0]["video_id"], "vid1");
    assert_eq!(body["liked"][0]["title"], "First video");

    // Clearing by bare id removes the same row.
    let response = server
        .delete("/api/v1/feedback")
        .json(&json!({ "key": "vid1", "kind": "video" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["liked"], json!([]));
}

#[tokio::test]
async fn test_liked_list_orders_videos_before_queries() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/v1/feedback")
        .json(&json!({ "key": "cats", "kind": "query", "feedback": "like" }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/feedback")
        .json(&json!({
            "key": "vid1",
            "kind": "video",
            "feedback": "like",
            "title": "First video"
        }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/feedback")
        .json(&json!({ "key": "dogs", "kind": "query", "feedback": "dislike" }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/liked").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let liked = body["liked"].as_array().unwrap();
    assert_eq!(liked.len(), 2);
    assert_eq!(liked[0]["type"], "video");
    assert_eq!(liked[0]["video_id"], "vid1");
    assert_eq!(liked[1]["type"], "query");
    assert_eq!(liked[1]["query"], "cats");
}

#[tokio::test]
async fn test_feedback_with_empty_key_is_rejected() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/api/v1/feedback")
        .json(&json!({ "key": "", "kind": "query", "feedback": "like" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discover_returns_suggestions_videos_and_liked() {
    let (server, calls) = create_test_server().await;

    let response = server
        .post("/api/v1/discover")
        .json(&json!({ "input": "cat documentaries" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 5);
    assert_eq!(suggestions[0], "cat documentaries query 1");
    assert_eq!(body["videos"].as_array().unwrap().len(), 2);
    assert_eq!(body["liked"], json!([]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_discover_skips_regeneration_for_same_input() {
    let (server, calls) = create_test_server().await;

    for _ in 0..3 {
        server
            .post("/api/v1/discover")
            .json(&json!({ "input": "cat documentaries" }))
            .await
            .assert_status_ok();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    server
        .post("/api/v1/discover")
        .json(&json!({ "input": "dog documentaries" }))
        .await
        .assert_status_ok();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_discover_blank_input_is_a_non_event() {
    let (server, calls) = create_test_server().await;

    let response = server
        .post("/api/v1/discover")
        .json(&json!({ "input": "   " }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["suggestions"], json!([]));
    assert_eq!(body["videos"], json!([]));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_discover_surfaces_generation_failure() {
    let (server, _) = create_test_server_with(true).await;

    let response = server
        .post("/api/v1/discover")
        .json(&json!({ "input": "cats" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to generate queries"));
}

#[tokio::test]
async fn test_suggestions_endpoint_is_cache_fronted() {
    let (server, calls) = create_test_server().await;

    let response = server
        .get("/api/v1/suggestions")
        .add_query_param("q", "cats")
        .await;
    response.assert_status_ok();
    let first: Vec<String> = response.json();
    assert_eq!(first.len(), 5);

    let response = server
        .get("/api/v1/suggestions")
        .add_query_param("q", "cats")
        .await;
    response.assert_status_ok();
    let second: Vec<String> = response.json();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_video_search_endpoint_honors_max_results() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/api/v1/videos/search")
        .add_query_param("q", "cats")
        .add_query_param("max_results", "1")
        .await;
    response.assert_status_ok();

    let videos: Vec<Value> = response.json();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["video_id"], "vid1");
}

#[tokio::test]
async fn test_feedback_mutations_are_visible_in_next_discover() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/v1/discover")
        .json(&json!({ "input": "cats" }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/feedback")
        .json(&json!({ "key": "cats query 1", "kind": "query", "feedback": "like" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/v1/discover")
        .json(&json!({ "input": "cats" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body["liked"],
        json!([{ "type": "query", "query": "cats query 1" }])
    );
}
