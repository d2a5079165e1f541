//! In-memory provider for unit tests

use crate::provider::{GenerateRequest, GenerationProvider, ProviderStatus};
use artpack_core::{GeneratedImage, GenerationError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded `request_image` call
#[derive(Debug, Clone)]
pub struct Call {
    pub prompt: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Replays scripted results, then applies per-prompt failure rules, then
/// succeeds with the prompt bytes as the image payload
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<GeneratedImage, GenerationError>>>,
    failing: Vec<(String, GenerationError)>,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: Vec<Result<GeneratedImage, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..self
        }
    }

    /// Every request whose prompt contains `needle` fails with `err`
    pub fn failing_on(mut self, needle: &str, err: GenerationError) -> Self {
        self.failing.push((needle.to_string(), err));
        self
    }

    pub fn always_failing(err: GenerationError) -> Self {
        Self::new().failing_on("", err)
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        Self { latency, ..self }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Prompts in completion order
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.prompt.clone()).collect()
    }
}

/// The image a scripted provider returns for `prompt` by default
pub fn image_for(prompt: &str) -> GeneratedImage {
    GeneratedImage::from_bytes("image/png", prompt.as_bytes())
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn health_check(&self) -> ProviderStatus {
        ProviderStatus::Available
    }

    async fn request_image(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.calls.lock().push(Call {
            prompt: request.prompt.clone(),
            started,
            finished: Instant::now(),
        });

        if let Some(scripted) = self.script.lock().pop_front() {
            return scripted;
        }
        if let Some((_, err)) = self
            .failing
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
        {
            return Err(err.clone());
        }
        Ok(image_for(&request.prompt))
    }
}
