//! Per-asset session state
//!
//! Created from a catalog at session start and dropped at session end.
//! Nothing here is persisted.

use artpack_core::{AssetSpec, Catalog, GeneratedImage};
use std::collections::HashMap;

/// Generation state of a single asset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetState {
    pub image: Option<GeneratedImage>,
    pub is_loading: bool,
}

/// A catalog entry joined with its current state
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSnapshot {
    pub spec: AssetSpec,
    pub state: AssetState,
}

impl AssetSnapshot {
    pub fn has_image(&self) -> bool {
        self.state.image.is_some()
    }
}

/// Progress counters over a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub generated: usize,
    pub loading: usize,
}

impl Stats {
    pub fn from_snapshot(snapshot: &[AssetSnapshot]) -> Self {
        Self {
            total: snapshot.len(),
            generated: snapshot.iter().filter(|a| a.has_image()).count(),
            loading: snapshot.iter().filter(|a| a.state.is_loading).count(),
        }
    }

    /// Completed fraction in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.generated as f32 / self.total as f32
        }
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} Assets Generated", self.generated, self.total)
    }
}

/// Mutable state for every asset in a catalog, keyed by id
#[derive(Debug, Default)]
pub struct SessionState {
    assets: HashMap<String, AssetState>,
}

impl SessionState {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            assets: catalog
                .iter()
                .map(|spec| (spec.id.clone(), AssetState::default()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AssetState> {
        self.assets.get(id)
    }

    /// Mark an asset as loading. Returns false if it is unknown or already loading.
    pub fn begin_loading(&mut self, id: &str) -> bool {
        match self.assets.get_mut(id) {
            Some(state) if !state.is_loading => {
                state.is_loading = true;
                true
            }
            _ => false,
        }
    }

    /// Store a fresh image and clear the loading flag
    pub fn complete(&mut self, id: &str, image: GeneratedImage) {
        if let Some(state) = self.assets.get_mut(id) {
            state.image = Some(image);
            state.is_loading = false;
        }
    }

    /// Clear the loading flag; any previous image stays
    pub fn fail(&mut self, id: &str) {
        if let Some(state) = self.assets.get_mut(id) {
            state.is_loading = false;
        }
    }

    /// Whether a batch should pick this asset up
    pub fn needs_generation(&self, id: &str) -> bool {
        self.assets
            .get(id)
            .map(|s| s.image.is_none() && !s.is_loading)
            .unwrap_or(false)
    }

    /// Join the catalog with current state, in catalog order
    pub fn snapshot(&self, catalog: &Catalog) -> Vec<AssetSnapshot> {
        catalog
            .iter()
            .map(|spec| AssetSnapshot {
                spec: spec.clone(),
                state: self.assets.get(&spec.id).cloned().unwrap_or_default(),
            })
            .collect()
    }
}
