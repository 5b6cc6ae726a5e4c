pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;

use crate::core::generator::CourseGenerator;
use crate::provider::VideoSearch;
use std::sync::Arc;

/// Shared, immutable handler dependencies.
pub struct AppState {
    pub generator: CourseGenerator,
    pub videos: Arc<dyn VideoSearch>,
    pub video_results: usize,
}
