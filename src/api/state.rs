use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::FeedbackStore;
use crate::error::AppResult;
use crate::services::providers::deepseek::DeepseekGenerator;
use crate::services::providers::youtube::YouTubeProvider;
use crate::services::providers::{QueryGenerator, VideoSearchProvider};
use crate::services::SuggestionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: FeedbackStore,
    pub suggestions: SuggestionService,
    pub video_search: Arc<dyn VideoSearchProvider>,
    pub session: Arc<RwLock<SessionContext>>,
}

/// Explicit per-session context: the last processed input and the
/// suggestions generated for it.
///
/// Kept in shared state rather than ambient globals so the discover flow
/// can detect input changes and skip redundant generation.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub last_input: Option<String>,
    pub suggestions: Vec<String>,
}

impl AppState {
    /// Assembles state from already-built components (used by tests to
    /// inject stub providers)
    pub fn new(
        store: FeedbackStore,
        suggestions: SuggestionService,
        video_search: Arc<dyn VideoSearchProvider>,
    ) -> Self {
        Self {
            store,
            suggestions,
            video_search,
            session: Arc::new(RwLock::new(SessionContext::default())),
        }
    }

    /// Builds the production providers from configuration
    pub fn from_config(config: &Config, pool: SqlitePool) -> AppResult<Self> {
        let generator: Arc<dyn QueryGenerator> = Arc::new(DeepseekGenerator::new(
            config.deepseek_api_key.clone(),
            config.deepseek_api_url.clone(),
        )?);
        let video_search: Arc<dyn VideoSearchProvider> = Arc::new(YouTubeProvider::new(
            config.youtube_api_key.clone(),
            config.youtube_api_url.clone(),
        ));

        tracing::info!(
            generator = generator.name(),
            video_search = video_search.name(),
            "Providers configured"
        );

        Ok(Self::new(
            FeedbackStore::new(pool),
            SuggestionService::new(generator),
            video_search,
        ))
    }
}
