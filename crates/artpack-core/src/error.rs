//! Error types for artpack

use std::fmt;
use thiserror::Error;

/// The main error type for artpack operations
#[derive(Debug, Error)]
pub enum ArtpackError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Result type alias for artpack operations
pub type Result<T> = std::result::Result<T, ArtpackError>;

impl From<toml::de::Error> for ArtpackError {
    fn from(err: toml::de::Error) -> Self {
        ArtpackError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ArtpackError {
    fn from(err: toml::ser::Error) -> Self {
        ArtpackError::TomlSerError(err.to_string())
    }
}

/// Failure classes reported by an image generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationErrorKind {
    /// Quota exhausted (HTTP 429 / `RESOURCE_EXHAUSTED`)
    RateLimited,
    /// Transient backend or transport fault
    ServerError,
    /// The backend answered but produced no image
    NoImageReturned,
    /// The configured key is missing, invalid or unknown to the backend
    InvalidCredential,
    Unknown,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationErrorKind::RateLimited => write!(f, "rate limited"),
            GenerationErrorKind::ServerError => write!(f, "server error"),
            GenerationErrorKind::NoImageReturned => write!(f, "no image returned"),
            GenerationErrorKind::InvalidCredential => write!(f, "invalid credential"),
            GenerationErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Message the backend uses when the selected key or project does not exist
pub const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// A single failed generation attempt, classified for retry decisions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    /// HTTP status code, when the failure came from an HTTP response
    pub status: Option<u16>,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn no_image() -> Self {
        Self::new(
            GenerationErrorKind::NoImageReturned,
            "No image data returned from model",
        )
    }

    /// Classify a structured backend error.
    ///
    /// The HTTP status and the RPC status string are consulted first; the
    /// message text is only inspected when neither is conclusive.
    pub fn from_response(http_status: u16, rpc_status: Option<&str>, message: &str) -> Self {
        let kind = classify_structured(http_status, rpc_status, message)
            .unwrap_or_else(|| classify_message(message));
        Self {
            kind,
            status: Some(http_status),
            message: message.to_string(),
        }
    }

    /// Classify an error for which only a message is available
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_message(&message),
            status: None,
            message,
        }
    }
}

fn classify_structured(
    http_status: u16,
    rpc_status: Option<&str>,
    message: &str,
) -> Option<GenerationErrorKind> {
    match rpc_status {
        Some("RESOURCE_EXHAUSTED") => return Some(GenerationErrorKind::RateLimited),
        Some("INTERNAL") | Some("UNAVAILABLE") | Some("DEADLINE_EXCEEDED") => {
            return Some(GenerationErrorKind::ServerError)
        }
        Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED") => {
            return Some(GenerationErrorKind::InvalidCredential)
        }
        Some("NOT_FOUND") if message.contains(ENTITY_NOT_FOUND) => {
            return Some(GenerationErrorKind::InvalidCredential)
        }
        _ => {}
    }

    match http_status {
        429 => Some(GenerationErrorKind::RateLimited),
        500..=599 => Some(GenerationErrorKind::ServerError),
        401 | 403 => Some(GenerationErrorKind::InvalidCredential),
        _ => None,
    }
}

fn classify_message(message: &str) -> GenerationErrorKind {
    if message.contains("429") || message.contains("RESOURCE_EXHAUSTED") {
        GenerationErrorKind::RateLimited
    } else if message.contains("500") || message.contains("Rpc failed") {
        GenerationErrorKind::ServerError
    } else if message.contains(ENTITY_NOT_FOUND) {
        GenerationErrorKind::InvalidCredential
    } else {
        GenerationErrorKind::Unknown
    }
}
