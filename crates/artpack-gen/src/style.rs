//! Style lock for generation prompts
//!
//! Every prompt sent to a backend is enriched with the same style text so the
//! whole pack shares one look regardless of per-asset prompt wording.

use artpack_core::{ArtpackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Suffix used by the built-in glossy bubble-shooter style
pub const STYLE_LOCK_SUFFIX: &str = "Glossy 3D mobile game art, hyper-casual, vibrant colors, soft reflections, glass-like shine, slight transparency, smooth gradients, clean edges, professional game assets, studio lighting, high resolution, 2k quality, isolated on plain white background for sprite use.";

pub const BUILTIN_STYLE_NAME: &str = "glossy_bubble";

/// A style guide that enriches generation prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGuide {
    /// Style name (e.g., "glossy_bubble")
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Text placed before every prompt
    #[serde(default)]
    pub prompt_prefix: Option<String>,
    /// Style-lock text appended to every prompt
    #[serde(default)]
    pub prompt_suffix: Option<String>,
}

/// TOML file wrapper
#[derive(Debug, Deserialize)]
struct StyleFile {
    style: StyleGuide,
}

impl Default for StyleGuide {
    fn default() -> Self {
        Self::glossy_bubble()
    }
}

impl StyleGuide {
    /// The built-in bubble-shooter style
    pub fn glossy_bubble() -> Self {
        Self {
            name: BUILTIN_STYLE_NAME.to_string(),
            description: Some("Glossy hyper-casual 3D mobile game art".to_string()),
            prompt_prefix: None,
            prompt_suffix: Some(STYLE_LOCK_SUFFIX.to_string()),
        }
    }

    /// Load a style guide from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: StyleFile = toml::from_str(&content).map_err(|e| {
            ArtpackError::ConfigError(format!(
                "Failed to parse style guide {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.style)
    }

    /// Find and load a style guide by name, searching standard locations
    pub fn find(name: &str) -> Result<Self> {
        let candidates = [
            format!("styles/{}.style.toml", name),
            format!(".artpack/styles/{}.style.toml", name),
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load(path);
            }
        }

        if name == BUILTIN_STYLE_NAME {
            return Ok(Self::glossy_bubble());
        }

        Err(ArtpackError::ConfigError(format!(
            "Style guide '{}' not found (searched: {})",
            name,
            candidates.join(", ")
        )))
    }

    /// Resolve an optional style name, falling back to the built-in style
    pub fn resolve(name: Option<&str>) -> Result<Self> {
        match name {
            Some(n) => Self::find(n),
            None => Ok(Self::glossy_bubble()),
        }
    }

    /// Enrich a prompt with the style prefix and suffix
    pub fn enrich_prompt(&self, base_prompt: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(prefix) = self.prompt_prefix.as_deref() {
            parts.push(prefix);
        }
        parts.push(base_prompt);
        if let Some(suffix) = self.prompt_suffix.as_deref() {
            parts.push(suffix);
        }
        parts.join(" ")
    }
}
