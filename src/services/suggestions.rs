use std::sync::Arc;
use std::time::Duration;

use crate::{
    cached, db::QueryCache, error::AppResult, services::providers::QueryGenerator,
};

/// Generation results are memoized per input text for an hour.
const CACHE_TTL: Duration = Duration::from_secs(3600);
const CACHE_CAPACITY: usize = 100;

/// Cache-fronted suggestion generation
///
/// Sits between the HTTP surface and the [`QueryGenerator`] provider:
/// blank input short-circuits to an empty list, repeated input within the
/// cache TTL never reaches the provider, and provider failures pass through
/// to the caller untouched.
#[derive(Clone)]
pub struct SuggestionService {
    generator: Arc<dyn QueryGenerator>,
    cache: QueryCache<Vec<String>>,
}

impl SuggestionService {
    pub fn new(generator: Arc<dyn QueryGenerator>) -> Self {
        Self::with_cache(generator, QueryCache::new(CACHE_TTL, CACHE_CAPACITY))
    }

    /// Construct with an explicit cache, used by tests to shrink TTL and
    /// capacity.
    pub fn with_cache(generator: Arc<dyn QueryGenerator>, cache: QueryCache<Vec<String>>) -> Self {
        Self { generator, cache }
    }

    /// Generates up to 5 search queries for the given input text.
    ///
    /// Empty or whitespace-only input yields an empty list without touching
    /// the cache or the provider. Only successful results are cached.
    pub async fn generate(&self, input: &str) -> AppResult<Vec<String>> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        cached!(self.cache, input, async {
            tracing::debug!(input = %input, "Suggestion cache miss");
            self.generator.generate_queries(input).await
        })
    }
}
