//! Artpack Gen - image generation for game art packs
//!
//! A pluggable provider layer (Gemini, Mock), a style-locked client with
//! retry and backoff, a session orchestrator for single and batch generation,
//! and zip export of the finished pack.

pub mod archive;
pub mod client;
pub mod config;
pub mod credentials;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod state;
pub mod style;

#[cfg(test)]
mod testing;

pub use archive::{
    archive_path, download_file_name, export_archive, write_archive, write_single,
    ARCHIVE_FILE_NAME,
};
pub use client::{ImageClient, RetryPolicy};
pub use config::ArtpackConfig;
pub use credentials::{CredentialStore, KeySelection, KeySelector, BILLING_DOCS_URL};
pub use orchestrator::{
    BatchOutcome, BatchReport, FailureNotice, GenerateOutcome, Orchestrator, OrchestratorEvent,
    OrchestratorSettings,
};
pub use provider::{GenerateRequest, GenerationProvider, ProviderStatus};
pub use state::{AssetSnapshot, AssetState, Stats};
pub use style::StyleGuide;
