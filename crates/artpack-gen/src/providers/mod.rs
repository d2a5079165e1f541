//! Provider registry
//!
//! Maps provider names to concrete implementations.

pub mod gemini;
pub mod mock;

use crate::config::ArtpackConfig;
use crate::credentials::CredentialStore;
use crate::provider::GenerationProvider;
use artpack_core::{ArtpackError, Result};

/// Create a provider by name with configuration
pub fn create_provider(
    name: &str,
    config: &ArtpackConfig,
    credentials: &CredentialStore,
) -> Result<Box<dyn GenerationProvider>> {
    if !config.is_enabled(name) {
        return Err(ArtpackError::ProviderError(format!(
            "Provider '{}' is disabled in config",
            name
        )));
    }
    match name {
        "mock" => Ok(Box::new(mock::MockProvider::new())),
        "gemini" => Ok(Box::new(gemini::GeminiProvider::from_config(
            config,
            credentials.clone(),
        ))),
        _ => Err(ArtpackError::ProviderError(format!(
            "Unknown provider '{}'. Available: {}",
            name,
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["gemini", "mock"]
}
