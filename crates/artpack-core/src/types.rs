//! Asset data model

use crate::error::{ArtpackError, Result};
use crate::hash::ContentHash;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target width:height requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }

    /// Nominal pixel size at a 1024px long edge
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait3x4 => (768, 1024),
            AspectRatio::Landscape4x3 => (1024, 768),
            AspectRatio::Portrait9x16 => (576, 1024),
            AspectRatio::Landscape16x9 => (1024, 576),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset category, used for grouping and archive folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Background,
    NormalBubbles,
    SpecialBubbles,
    UiElements,
    EffectsFx,
    BoosterIcons,
    LevelMaps,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Background,
        Category::NormalBubbles,
        Category::SpecialBubbles,
        Category::UiElements,
        Category::EffectsFx,
        Category::BoosterIcons,
        Category::LevelMaps,
    ];

    /// Human-readable name, also the folder name inside the archive
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Background => "Backgrounds",
            Category::NormalBubbles => "Normal Bubbles",
            Category::SpecialBubbles => "Special Bubbles",
            Category::UiElements => "UI Elements",
            Category::EffectsFx => "Effects & FX",
            Category::BoosterIcons => "Booster Icons",
            Category::LevelMaps => "Level Maps",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Background => "background",
            Category::NormalBubbles => "normal_bubbles",
            Category::SpecialBubbles => "special_bubbles",
            Category::UiElements => "ui_elements",
            Category::EffectsFx => "effects_fx",
            Category::BoosterIcons => "booster_icons",
            Category::LevelMaps => "level_maps",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = ArtpackError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == wanted || c.display_name().to_lowercase() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
                ArtpackError::CatalogError(format!(
                    "Unknown category '{}'. Use one of: {}",
                    s,
                    keys.join(", ")
                ))
            })
    }
}

/// An art asset to produce. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub id: String,
    pub category: Category,
    pub name: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Subset of the catalog targeted by a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Category(Category),
}

impl Scope {
    pub fn contains(&self, asset: &AssetSpec) -> bool {
        match self {
            Scope::All => true,
            Scope::Category(c) => asset.category == *c,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "Full Pack"),
            Scope::Category(c) => write!(f, "{}", c),
        }
    }
}

/// An image as returned by the backend: base64 payload plus its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64 payload, kept in the encoding the backend delivered
    pub data: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Wrap raw bytes, encoding them as base64
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64.encode(bytes))
    }

    /// `data:` URL suitable for direct display
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.trim().as_bytes())
            .map_err(|e| ArtpackError::DecodeError(format!("invalid base64 image data: {}", e)))
    }

    pub fn content_hash(&self) -> Result<ContentHash> {
        Ok(ContentHash::from_bytes(&self.decode()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_serde_uses_ratio_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            ratio: AspectRatio,
        }
        let parsed: Wrapper = toml::from_str(r#"ratio = "9:16""#).unwrap();
        assert_eq!(parsed.ratio, AspectRatio::Portrait9x16);
        assert_eq!(parsed.ratio.to_string(), "9:16");
    }

    #[test]
    fn test_category_from_key_and_display_name() {
        assert_eq!("normal_bubbles".parse::<Category>().unwrap(), Category::NormalBubbles);
        assert_eq!("Effects & FX".parse::<Category>().unwrap(), Category::EffectsFx);
        assert_eq!("ui elements".parse::<Category>().unwrap(), Category::UiElements);
        assert!("hats".parse::<Category>().is_err());
    }

    #[test]
    fn test_scope_contains() {
        let asset = AssetSpec {
            id: "b-red".to_string(),
            category: Category::NormalBubbles,
            name: "Red Bubble".to_string(),
            prompt: "red".to_string(),
            aspect_ratio: AspectRatio::Square,
        };
        assert!(Scope::All.contains(&asset));
        assert!(Scope::Category(Category::NormalBubbles).contains(&asset));
        assert!(!Scope::Category(Category::LevelMaps).contains(&asset));
    }

    #[test]
    fn test_generated_image_data_url_and_decode() {
        let image = GeneratedImage::from_bytes("image/png", b"\x89PNG");
        assert_eq!(image.data_url(), format!("data:image/png;base64,{}", image.data));
        assert_eq!(image.decode().unwrap(), b"\x89PNG");
        assert!(image.content_hash().is_ok());
    }

    #[test]
    fn test_generated_image_bad_payload() {
        let image = GeneratedImage::new("image/png", "not base64!!");
        assert!(matches!(image.decode(), Err(ArtpackError::DecodeError(_))));
    }
}
