//! artpack core - data model shared by the generation pipeline and the CLI
//!
//! - `AssetSpec`, `Category`, `AspectRatio`, `Scope` - what to generate
//! - `Catalog` - the built-in bubble-shooter asset list
//! - `GeneratedImage`, `ContentHash` - generated payloads
//! - Error types and Result alias

mod catalog;
mod error;
mod hash;
mod types;

pub use catalog::Catalog;
pub use error::{ArtpackError, GenerationError, GenerationErrorKind, Result, ENTITY_NOT_FOUND};
pub use hash::ContentHash;
pub use types::{AspectRatio, AssetSpec, Category, GeneratedImage, Scope};
