pub mod cache;
pub mod feedback;
pub mod sqlite;

pub use cache::QueryCache;
pub use feedback::FeedbackStore;
pub use sqlite::{create_memory_pool, create_pool, init_schema};
