//! Image generation client
//!
//! Wraps a provider with the style lock and a retry-with-backoff policy.
//! One call is one logical generation; it may issue several requests.

use crate::config::ArtpackConfig;
use crate::provider::{GenerateRequest, GenerationProvider};
use crate::style::StyleGuide;
use artpack_core::{AspectRatio, GeneratedImage, GenerationError, GenerationErrorKind};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Which failures are retried, how often, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * 2^n`
    pub base_delay: Duration,
    /// Treat an answer without an image as a transient fault
    pub retry_empty_responses: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(1),
            retry_empty_responses: true,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ArtpackConfig) -> Self {
        Self {
            max_retries: config.generation.max_retries,
            base_delay: config.backoff_base(),
            retry_empty_responses: config.generation.retry_empty_responses,
        }
    }

    /// Backoff before retry `attempt` (1-based): 2s, 4s, 8s with a 1s base
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    pub fn is_retryable(&self, kind: GenerationErrorKind) -> bool {
        match kind {
            GenerationErrorKind::RateLimited | GenerationErrorKind::ServerError => true,
            GenerationErrorKind::NoImageReturned => self.retry_empty_responses,
            GenerationErrorKind::InvalidCredential | GenerationErrorKind::Unknown => false,
        }
    }
}

/// Style-locked, retrying front for a single provider
pub struct ImageClient {
    provider: Arc<dyn GenerationProvider>,
    style: StyleGuide,
    policy: RetryPolicy,
}

impl ImageClient {
    pub fn new(provider: Arc<dyn GenerationProvider>, style: StyleGuide, policy: RetryPolicy) -> Self {
        Self {
            provider,
            style,
            policy,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The exact prompt sent for a given asset prompt
    pub fn build_prompt(&self, prompt: &str) -> String {
        self.style.enrich_prompt(prompt)
    }

    /// Generate with the configured retry ceiling
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage, GenerationError> {
        self.generate_with_retries(prompt, aspect_ratio, self.policy.max_retries)
            .await
    }

    /// Generate, retrying transient failures up to `max_retries` times
    pub async fn generate_with_retries(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        max_retries: u32,
    ) -> Result<GeneratedImage, GenerationError> {
        let request = GenerateRequest {
            prompt: self.build_prompt(prompt),
            aspect_ratio,
        };

        let mut attempt: u32 = 0;
        loop {
            match self.provider.request_image(&request).await {
                Ok(image) => return Ok(image),
                Err(err) => {
                    attempt += 1;
                    if self.policy.is_retryable(err.kind) && attempt <= max_retries {
                        let delay = self.policy.delay_for(attempt);
                        tracing::warn!(
                            provider = self.provider.name(),
                            attempt,
                            kind = %err.kind,
                            delay_ms = delay.as_millis() as u64,
                            "generation attempt failed ({}), retrying",
                            err
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    tracing::error!(
                        provider = self.provider.name(),
                        attempt,
                        kind = %err.kind,
                        "image generation final failure: {}",
                        err
                    );
                    return Err(err);
                }
            }
        }
    }
}
