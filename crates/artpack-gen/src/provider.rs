//! Generation provider trait and request types

use artpack_core::{AspectRatio, GeneratedImage, GenerationError};
use async_trait::async_trait;

/// One image request, with the style lock already applied to the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    NoApiKey,
}

/// Trait implemented by each image backend (Gemini, Mock)
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name (e.g. "gemini", "mock")
    fn name(&self) -> &str;

    /// Check if the provider is usable (key selected, enabled)
    fn health_check(&self) -> ProviderStatus;

    /// Perform exactly one request/response cycle. Retrying is the caller's job.
    async fn request_image(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedImage, GenerationError>;
}
