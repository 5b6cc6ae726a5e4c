//! Outbound integrations: the text model and the video lookup.

pub mod gemini;
pub mod youtube;

use crate::common::error::ProviderError;
use crate::core::document::VideoLink;
use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use youtube::{NoVideoSearch, YouTubeClient};

/// A generative text model. One call, one prompt, raw text back.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoLink>, ProviderError>;
}
