/// External provider abstractions
///
/// This module isolates the two outbound integrations behind traits: the
/// text-generation provider that turns free-text into search queries, and
/// the video-search provider that resolves a query into video descriptors.
/// Handlers and services only ever see the traits, which keeps both sides
/// mockable in tests.
use crate::{error::AppResult, models::Video};

pub mod deepseek;
pub mod youtube;

/// Trait for search-query generation providers
///
/// Implementations own their failure policy at the contract level: any
/// transport or response problem surfaces to the caller with its cause
/// attached, with no retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Generate up to 5 search queries about the given input text.
    ///
    /// Callers are expected to have rejected blank input already; a missing
    /// credential yields an empty list rather than an error.
    async fn generate_queries(&self, input: &str) -> AppResult<Vec<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for video-search providers
///
/// The infallible return type is deliberate: provider-side failures are
/// logged and degrade to an empty result, never surfaced to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Search for videos matching the query, in provider relevance order.
    async fn search(&self, query: &str, max_results: u32) -> Vec<Video>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
