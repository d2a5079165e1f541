//! Asset catalog: the fixed list of art assets a pack is made of

use crate::error::{ArtpackError, Result};
use crate::types::{AspectRatio, AssetSpec, Category, Scope};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use AspectRatio::{Portrait9x16 as TALL, Square as SQUARE};
use Category::*;

/// (id, category, name, prompt, aspect ratio)
type Entry = (&'static str, Category, &'static str, &'static str, AspectRatio);

const BUILTIN_ASSETS: &[Entry] = &[
    ("bg-main", Background, "Main Game Background", "Soft gradient sky with blue, purple, and pink colors, glowing bokeh lights, smooth lighting, clean and bright atmosphere, dreamlike mobile game background.", TALL),
    ("b-red", NormalBubbles, "Red Bubble", "Single red glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-blue", NormalBubbles, "Blue Bubble", "Single blue glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-yellow", NormalBubbles, "Yellow Bubble", "Single yellow glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-green", NormalBubbles, "Green Bubble", "Single green glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-purple", NormalBubbles, "Purple Bubble", "Single purple glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-pink", NormalBubbles, "Pink Bubble", "Single pink glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("b-orange", NormalBubbles, "Orange Bubble", "Single orange glossy 3D bubble, shiny glass reflection, perfectly spherical, translucent.", SQUARE),
    ("s-bomb", SpecialBubbles, "Bomb Bubble", "3D bomb bubble with a glowing fuse and sparks, metallic glossy finish, spherical.", SQUARE),
    ("s-rainbow", SpecialBubbles, "Rainbow Bubble", "3D rainbow bubble with swirling multicolor gradients, pearlescent finish, magical glow.", SQUARE),
    ("s-lightning", SpecialBubbles, "Lightning Bubble", "3D glass bubble with electric energy and lightning bolts inside, neon cyan glow.", SQUARE),
    ("s-fire", SpecialBubbles, "Fire Bubble", "3D fire bubble with internal flame glow, hot embers inside translucent orange glass.", SQUARE),
    ("s-ice", SpecialBubbles, "Ice Bubble", "3D ice bubble with frosty frozen texture, crystalline edges, cool blue translucent tones.", SQUARE),
    ("s-changer", SpecialBubbles, "Color-Changer Bubble", "3D bubble with shifting hues, iridescent material, oily sheen, holographic reflections.", SQUARE),
    ("fx-trail", EffectsFx, "Shooting Trail FX", "Glowing multicolor shooting trail, neon streaks, floating particles, curved motion blur effect, magical.", SQUARE),
    ("fx-aim", EffectsFx, "Aiming Trajectory", "Dotted glowing line trajectory, evenly spaced neon dots, soft glow, curved path sprite.", SQUARE),
    ("ui-launcher", UiElements, "Bubble Launcher", "Cute glossy 3D bubble launcher device, holding one bubble, soft shadows, clean tech-toy look.", SQUARE),
    ("world-map", LevelMaps, "World Map", "Floating islands world map, cute paths, numbered level nodes, bright cartoon style, volumetric lighting.", TALL),
    ("bg-complete", Background, "Victory Screen", "Level complete background, confetti, glowing rays, sparkles, empty center for UI, celebratory mood.", TALL),
    ("ui-btn-play", UiElements, "Play Button", "Rounded glossy 3D \"Play\" button icon, bright green, glass reflection, soft shadow.", SQUARE),
    ("ui-btn-pause", UiElements, "Pause Button", "Rounded glossy 3D \"Pause\" button icon, bright yellow, glass reflection, soft shadow.", SQUARE),
    ("ui-btn-settings", UiElements, "Settings Button", "Rounded glossy 3D gear settings icon button, blue, glass reflection, soft shadow.", SQUARE),
    ("ui-btn-home", UiElements, "Home Button", "Rounded glossy 3D house home icon button, red, glass reflection, soft shadow.", SQUARE),
    ("ui-btn-restart", UiElements, "Restart Button", "Rounded glossy 3D refresh restart icon button, orange, glass reflection, soft shadow.", SQUARE),
    ("boost-bomb", BoosterIcons, "Bomb Booster", "Booster icon for bomb, glossy 3D badge with bomb symbol, bright colors.", SQUARE),
    ("boost-rainbow", BoosterIcons, "Rainbow Booster", "Booster icon for rainbow bubble, glossy 3D badge with swirl symbol, bright colors.", SQUARE),
    ("boost-moves", BoosterIcons, "Extra Moves", "Booster icon for extra moves, glossy 3D badge with \"+5\" symbol, bright colors.", SQUARE),
    ("boost-lightning", BoosterIcons, "Lightning Booster", "Booster icon for lightning, glossy 3D badge with bolt symbol, bright colors.", SQUARE),
    ("fx-pop", EffectsFx, "Bubble Pop FX", "Bubble burst effect, glowing particles, small sparkles, soft explosion, colorful satisfying sprite.", SQUARE),
];

/// Ordered, id-indexed collection of asset specs
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    assets: Vec<AssetSpec>,
    /// id -> position in `assets`
    index: HashMap<String, usize>,
}

/// TOML file wrapper (`[[asset]]` tables)
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    asset: Vec<AssetSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bubble-shooter art pack
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (id, category, name, prompt, aspect_ratio) in BUILTIN_ASSETS {
            catalog.assets.push(AssetSpec {
                id: id.to_string(),
                category: *category,
                name: name.to_string(),
                prompt: prompt.to_string(),
                aspect_ratio: *aspect_ratio,
            });
            catalog.index.insert(id.to_string(), catalog.assets.len() - 1);
        }
        catalog
    }

    /// Build a catalog from specs, rejecting duplicate ids
    pub fn from_specs(specs: Vec<AssetSpec>) -> Result<Self> {
        let mut catalog = Self::new();
        for spec in specs {
            catalog.register(spec)?;
        }
        Ok(catalog)
    }

    /// Load a replacement catalog from a TOML file of `[[asset]]` tables
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            ArtpackError::CatalogError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        if file.asset.is_empty() {
            return Err(ArtpackError::CatalogError(format!(
                "{} defines no assets",
                path.display()
            )));
        }
        Self::from_specs(file.asset)
    }

    pub fn register(&mut self, spec: AssetSpec) -> Result<()> {
        if self.index.contains_key(&spec.id) {
            return Err(ArtpackError::CatalogError(format!(
                "Duplicate asset id: {}",
                spec.id
            )));
        }
        self.index.insert(spec.id.clone(), self.assets.len());
        self.assets.push(spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AssetSpec> {
        self.index.get(id).map(|&i| &self.assets[i])
    }

    /// Like [`Catalog::get`], failing with [`ArtpackError::UnknownAsset`]
    pub fn require(&self, id: &str) -> Result<&AssetSpec> {
        self.get(id)
            .ok_or_else(|| ArtpackError::UnknownAsset(id.to_string()))
    }

    /// All assets in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AssetSpec> {
        self.assets.iter()
    }

    /// Assets inside a scope, in declaration order
    pub fn in_scope(&self, scope: Scope) -> impl Iterator<Item = &AssetSpec> {
        self.assets.iter().filter(move |a| scope.contains(a))
    }

    pub fn by_category(&self, category: Category) -> Vec<&AssetSpec> {
        self.in_scope(Scope::Category(category)).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_require_unknown_asset() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.require("b-red").unwrap().name, "Red Bubble");
        let err = catalog.require("b-mauve").unwrap_err();
        assert!(matches!(err, ArtpackError::UnknownAsset(ref id) if id == "b-mauve"));
        assert_eq!(err.to_string(), "Unknown asset: b-mauve");
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 29);
        for category in Category::ALL {
            assert!(
                !catalog.by_category(category).is_empty(),
                "{} has no assets",
                category
            );
        }
        assert_eq!(catalog.iter().next().unwrap().id, "bg-main");
    }

    #[test]
    fn test_builtin_ids_unique() {
        let catalog = Catalog::builtin();
        let specs: Vec<AssetSpec> = catalog.iter().cloned().collect();
        assert!(Catalog::from_specs(specs).is_ok());
    }

    #[test]
    fn test_get_red_bubble() {
        let catalog = Catalog::builtin();
        let red = catalog.get("b-red").unwrap();
        assert_eq!(red.name, "Red Bubble");
        assert_eq!(red.aspect_ratio, AspectRatio::Square);
        assert!(red.prompt.starts_with("Single red glossy 3D bubble"));
        assert!(catalog.get("b-teal").is_none());
    }

    #[test]
    fn test_in_scope_keeps_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog
            .in_scope(Scope::Category(Category::Background))
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bg-main", "bg-complete"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let spec = Catalog::builtin().get("b-red").unwrap().clone();
        let result = Catalog::from_specs(vec![spec.clone(), spec]);
        assert!(matches!(result, Err(ArtpackError::CatalogError(_))));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = std::env::temp_dir().join(format!("artpack_catalog_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"
[[asset]]
id = "gem-blue"
category = "special_bubbles"
name = "Blue Gem"
prompt = "Faceted blue gem bubble"
aspect_ratio = "1:1"

[[asset]]
id = "bg-night"
category = "background"
name = "Night Sky"
prompt = "Starry night sky"
aspect_ratio = "9:16"
"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("bg-night").unwrap().aspect_ratio, AspectRatio::Portrait9x16);
        assert_eq!(catalog.get("gem-blue").unwrap().category, Category::SpecialBubbles);

        std::fs::remove_dir_all(&dir).ok();
    }
}
