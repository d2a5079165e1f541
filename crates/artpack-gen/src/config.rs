//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ARTPACK_GEMINI_API_KEY`, `GEMINI_API_KEY`, `API_KEY`
//! 2. Project-local: `.artpack/config.toml`
//! 3. Global: `~/.artpack/config.toml`

use artpack_core::{ArtpackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provider-specific configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            enabled: true,
        }
    }
}

/// Generation and batching settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub provider: String,
    pub style: Option<String>,
    pub max_retries: u32,
    /// Backoff before retry `n` is `backoff_base_ms * 2^n`
    pub backoff_base_ms: u64,
    /// Pause between one batch request finishing and the next starting
    pub request_pause_ms: u64,
    /// Batch worker slots; 1 keeps dispatch strictly sequential
    pub workers: usize,
    pub retry_empty_responses: bool,
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            style: None,
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            request_pause_ms: default_request_pause_ms(),
            workers: default_workers(),
            retry_empty_responses: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    1000
}
fn default_request_pause_ms() -> u64 {
    1500
}
fn default_workers() -> usize {
    1
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Provider table as written in a config file; unset keys inherit from lower layers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProviderFileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

/// `[generation]` table as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GenerationFileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backoff_base_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_pause_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_empty_responses: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ArtpackConfigFile {
    #[serde(default)]
    providers: HashMap<String, ProviderFileConfig>,
    #[serde(default)]
    generation: GenerationFileConfig,
}

impl ArtpackConfigFile {
    /// Fill every setting no layer provided with its built-in default
    fn resolve(self) -> ArtpackConfig {
        let providers = self
            .providers
            .into_iter()
            .map(|(name, p)| {
                let resolved = ProviderConfig {
                    api_key: p.api_key,
                    api_url: p.api_url,
                    model: p.model,
                    enabled: p.enabled.unwrap_or(true),
                };
                (name, resolved)
            })
            .collect();

        let g = self.generation;
        let generation = GenerationConfig {
            provider: g.provider.unwrap_or_else(default_provider),
            style: g.style,
            max_retries: g.max_retries.unwrap_or_else(default_max_retries),
            backoff_base_ms: g.backoff_base_ms.unwrap_or_else(default_backoff_base_ms),
            request_pause_ms: g.request_pause_ms.unwrap_or_else(default_request_pause_ms),
            workers: g.workers.unwrap_or_else(default_workers),
            retry_empty_responses: g.retry_empty_responses.unwrap_or(true),
            request_timeout_secs: g
                .request_timeout_secs
                .unwrap_or_else(default_request_timeout_secs),
        };

        ArtpackConfig {
            providers,
            generation,
        }
    }
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct ArtpackConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
}

/// Environment variables checked for the Gemini key, in priority order
const GEMINI_KEY_VARS: [&str; 3] = ["ARTPACK_GEMINI_API_KEY", "GEMINI_API_KEY", "API_KEY"];

impl ArtpackConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = ArtpackConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".artpack/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok());

        Ok(config.resolve())
    }

    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    pub fn model(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.model.as_deref())
    }

    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    pub fn default_provider(&self) -> &str {
        &self.generation.provider
    }

    pub fn default_style(&self) -> Option<&str> {
        self.generation.style.as_deref()
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.generation.backoff_base_ms)
    }

    pub fn request_pause(&self) -> Duration {
        Duration::from_millis(self.generation.request_pause_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.request_timeout_secs)
    }

    /// Store an API key in the global config file, keeping its other settings
    pub fn save_global_api_key(provider_name: &str, key: &str) -> Result<PathBuf> {
        let path = Self::global_config_path().ok_or_else(|| {
            ArtpackError::ConfigError("Could not determine home directory".to_string())
        })?;
        Self::save_api_key(&path, provider_name, key)?;
        Ok(path)
    }

    /// Store an API key for `provider_name` in the config file at `path`
    pub fn save_api_key(path: &Path, provider_name: &str, key: &str) -> Result<()> {
        let mut file = if path.exists() {
            Self::load_file(path)?
        } else {
            ArtpackConfigFile::default()
        };
        file.providers
            .entry(provider_name.to_string())
            .or_default()
            .api_key = Some(key.trim().to_string());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".artpack").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ArtpackConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: ArtpackConfigFile = toml::from_str(&content).map_err(|e| {
            ArtpackError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        if config.generation.workers == Some(0) {
            return Err(ArtpackError::ConfigError(format!(
                "{}: generation.workers must be at least 1",
                path.display()
            )));
        }
        Ok(config)
    }

    fn merge_into(base: &mut ArtpackConfigFile, overlay: ArtpackConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.model.is_some() {
                entry.model = provider.model;
            }
            if provider.enabled.is_some() {
                entry.enabled = provider.enabled;
            }
        }

        let incoming = overlay.generation;
        let generation = &mut base.generation;
        if incoming.provider.is_some() {
            generation.provider = incoming.provider;
        }
        if incoming.style.is_some() {
            generation.style = incoming.style;
        }
        if incoming.max_retries.is_some() {
            generation.max_retries = incoming.max_retries;
        }
        if incoming.backoff_base_ms.is_some() {
            generation.backoff_base_ms = incoming.backoff_base_ms;
        }
        if incoming.request_pause_ms.is_some() {
            generation.request_pause_ms = incoming.request_pause_ms;
        }
        if incoming.workers.is_some() {
            generation.workers = incoming.workers;
        }
        if incoming.retry_empty_responses.is_some() {
            generation.retry_empty_responses = incoming.retry_empty_responses;
        }
        if incoming.request_timeout_secs.is_some() {
            generation.request_timeout_secs = incoming.request_timeout_secs;
        }
    }

    fn apply_env_overrides<F>(config: &mut ArtpackConfigFile, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = GEMINI_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if let Some(key) = key {
            let entry = config.providers.entry("gemini".to_string()).or_default();
            entry.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("artpack_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_file() {
        let path = temp_config(
            r#"
[providers.gemini]
api_key = "file-key"
api_url = "https://example.com/v1beta"
model = "gemini-test-image"

[providers.mock]
enabled = false

[generation]
provider = "mock"
style = "glossy_bubble"
max_retries = 5
request_pause_ms = 250
workers = 2
"#,
        );
        let loaded = ArtpackConfig::load_file(&path).unwrap().resolve();
        assert_eq!(loaded.default_provider(), "mock");
        assert_eq!(loaded.default_style(), Some("glossy_bubble"));
        assert_eq!(loaded.generation.max_retries, 5);
        assert_eq!(loaded.generation.workers, 2);
        assert_eq!(loaded.backoff_base(), Duration::from_secs(1));
        assert!(!loaded.is_enabled("mock"));
        assert!(loaded.is_enabled("gemini"));
        assert_eq!(loaded.model("gemini"), Some("gemini-test-image"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_save_api_key_preserves_settings() {
        let path = temp_config("[generation]\nprovider = \"mock\"\nworkers = 3\n");
        ArtpackConfig::save_api_key(&path, "gemini", "  saved-key \n").unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("max_retries"));

        let loaded = ArtpackConfig::load_file(&path).unwrap().resolve();
        assert_eq!(loaded.api_key("gemini"), Some("saved-key"));
        assert!(loaded.is_enabled("gemini"));
        assert_eq!(loaded.default_provider(), "mock");
        assert_eq!(loaded.generation.workers, 3);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_zero_workers_rejected() {
        let path = temp_config("[generation]\nworkers = 0\n");
        let result = ArtpackConfig::load_file(&path);
        assert!(matches!(result, Err(ArtpackError::ConfigError(_))));
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = ArtpackConfigFile::default();
        base.providers.insert(
            "gemini".to_string(),
            ProviderFileConfig {
                api_key: Some("global".to_string()),
                api_url: Some("https://global.example".to_string()),
                ..Default::default()
            },
        );

        let mut overlay = ArtpackConfigFile::default();
        overlay.providers.insert(
            "gemini".to_string(),
            ProviderFileConfig {
                api_key: Some("project".to_string()),
                ..Default::default()
            },
        );
        overlay.generation.request_pause_ms = Some(3000);

        ArtpackConfig::merge_into(&mut base, overlay);
        let config = base.resolve();
        assert_eq!(config.api_key("gemini"), Some("project"));
        assert_eq!(config.api_url("gemini"), Some("https://global.example"));
        assert_eq!(config.request_pause(), Duration::from_millis(3000));
        assert_eq!(config.generation.max_retries, 3);
    }

    #[test]
    fn test_project_restores_default_values() {
        let global = temp_config(
            r#"
[providers.gemini]
enabled = false

[generation]
workers = 2
request_pause_ms = 200
max_retries = 1
retry_empty_responses = false
"#,
        );
        let project = temp_config(
            r#"
[providers.gemini]
model = "m"

[generation]
workers = 1
request_pause_ms = 1500
max_retries = 3
retry_empty_responses = true
"#,
        );

        let mut merged = ArtpackConfigFile::default();
        ArtpackConfig::merge_into(&mut merged, ArtpackConfig::load_file(&global).unwrap());
        ArtpackConfig::merge_into(&mut merged, ArtpackConfig::load_file(&project).unwrap());
        let config = merged.resolve();

        assert_eq!(config.generation.workers, 1);
        assert_eq!(config.request_pause(), Duration::from_millis(1500));
        assert_eq!(config.generation.max_retries, 3);
        assert!(config.generation.retry_empty_responses);
        assert_eq!(config.model("gemini"), Some("m"));
        assert!(!config.is_enabled("gemini"));

        for path in [global, project] {
            std::fs::remove_file(&path).ok();
            std::fs::remove_dir(path.parent().unwrap()).ok();
        }
    }

    #[test]
    fn test_env_override_priority() {
        let mut config = ArtpackConfigFile::default();
        ArtpackConfig::apply_env_overrides(&mut config, |name| match name {
            "GEMINI_API_KEY" => Some("gemini-env".to_string()),
            "API_KEY" => Some("plain-env".to_string()),
            _ => None,
        });
        assert_eq!(config.providers["gemini"].api_key.as_deref(), Some("gemini-env"));

        let mut config = ArtpackConfigFile::default();
        ArtpackConfig::apply_env_overrides(&mut config, |name| match name {
            "ARTPACK_GEMINI_API_KEY" => Some("   ".to_string()),
            "API_KEY" => Some("plain-env".to_string()),
            _ => None,
        });
        assert_eq!(config.providers["gemini"].api_key.as_deref(), Some("plain-env"));
    }

    #[test]
    fn test_defaults() {
        let config = ArtpackConfig::default();
        assert_eq!(config.default_provider(), "gemini");
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
        assert_eq!(config.request_pause(), Duration::from_millis(1500));
        assert_eq!(config.generation.workers, 1);
        assert!(config.generation.retry_empty_responses);
        assert_eq!(config.api_key("gemini"), None);
        assert!(config.is_enabled("nonexistent"));
        assert_eq!(ArtpackConfigFile::default().resolve().generation.max_retries, 3);
    }
}
