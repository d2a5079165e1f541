//! CLI command implementations

pub mod catalog;
pub mod generate;
pub mod key;
pub mod pack;
pub mod providers;

use anyhow::{Context, Result};
use artpack_core::{Catalog, Category, Scope};
use artpack_gen::providers::create_provider;
use artpack_gen::{
    ArtpackConfig, CredentialStore, ImageClient, KeySelection, KeySelector, Orchestrator,
    OrchestratorSettings, ProviderStatus, RetryPolicy, StyleGuide,
};
use std::path::Path;
use std::sync::Arc;

/// Options shared by commands that talk to a provider
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions<'a> {
    pub catalog: Option<&'a str>,
    pub provider: Option<&'a str>,
    pub style: Option<&'a str>,
}

/// A ready-to-use orchestrator for one command run
pub struct Session {
    pub orchestrator: Orchestrator,
}

impl Session {
    pub fn provider_name(&self) -> &str {
        self.orchestrator.client().provider_name()
    }
}

/// Load layered config, falling back to defaults when a file is broken
pub fn load_config() -> ArtpackConfig {
    ArtpackConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using default settings", e);
        ArtpackConfig::default()
    })
}

pub fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(p) => Catalog::load(Path::new(p))
            .with_context(|| format!("Failed to load catalog from {}", p)),
        None => Ok(Catalog::builtin()),
    }
}

/// Resolve a style by name, warning and using the built-in style if it cannot be loaded
pub fn load_style(name: Option<&str>, config: &ArtpackConfig) -> StyleGuide {
    let name = name.or_else(|| config.default_style());
    StyleGuide::resolve(name).unwrap_or_else(|e| {
        eprintln!("Warning: {}; using the built-in style", e);
        StyleGuide::glossy_bubble()
    })
}

pub fn parse_scope(category: Option<&str>) -> Result<Scope> {
    match category {
        Some(c) => Ok(Scope::Category(c.parse::<Category>()?)),
        None => Ok(Scope::All),
    }
}

/// Build the orchestrator for a generation run, asking for a key if the
/// provider needs one and none is configured
pub async fn open_session(options: SessionOptions<'_>) -> Result<Session> {
    let config = load_config();
    let catalog = load_catalog(options.catalog)?;
    let style = load_style(options.style, &config);
    let provider_name = options
        .provider
        .unwrap_or_else(|| config.default_provider())
        .to_string();

    let credentials = CredentialStore::new();
    let provider = create_provider(&provider_name, &config, &credentials)?;

    match provider.health_check() {
        ProviderStatus::Available => {}
        ProviderStatus::NoApiKey => {
            let selector = key::CliKeySelector::new(credentials.clone());
            match selector.open_select_key().await {
                KeySelection::Selected => {}
                KeySelection::Cancelled => anyhow::bail!("No API key selected"),
                KeySelection::Unavailable { docs_url } => anyhow::bail!(
                    "No Gemini API key found. Set GEMINI_API_KEY, run `artpack key select`, or see {}",
                    docs_url
                ),
            }
        }
    }

    tracing::debug!(provider = %provider_name, style = %style.name, assets = catalog.len(), "session opened");

    let client = ImageClient::new(
        Arc::from(provider),
        style,
        RetryPolicy::from_config(&config),
    );
    let orchestrator = Orchestrator::new(catalog, client, OrchestratorSettings::from_config(&config));
    if credentials.has_selected_key() {
        orchestrator.mark_key_selected();
    }

    Ok(Session { orchestrator })
}
