//! API key selection
//!
//! Providers read the key from a shared [`CredentialStore`] on every attempt,
//! so a key selected mid-session takes effect without restarting anything.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Where users are sent when no key selection capability is available
pub const BILLING_DOCS_URL: &str = "https://ai.google.dev/gemini-api/docs/billing";

/// Shared, interior-mutable holder of the current API key
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: Option<&str>) -> Self {
        let store = Self::new();
        if let Some(k) = key {
            store.select_key(k);
        }
        store
    }

    pub fn has_selected_key(&self) -> bool {
        self.key.read().is_some()
    }

    /// Replace the current key; blank keys clear the selection
    pub fn select_key(&self, key: &str) {
        let trimmed = key.trim();
        *self.key.write() = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Snapshot of the key to use for one request
    pub fn current(&self) -> Option<String> {
        self.key.read().clone()
    }
}

/// Outcome of asking the host to select a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    Selected,
    /// The user dismissed the selection
    Cancelled,
    /// No selection capability; point the user at the billing docs instead
    Unavailable { docs_url: &'static str },
}

/// Host-provided key selection capability, consumed by the front end
#[async_trait]
pub trait KeySelector: Send + Sync {
    async fn has_selected_api_key(&self) -> bool;

    /// Ask the user for a key. Resolves once the user has acted.
    async fn open_select_key(&self) -> KeySelection;
}
