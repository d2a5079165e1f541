//! Gemini image generation provider
//!
//! Calls `models/{model}:generateContent` and returns the first inline image
//! of the first candidate. The HTTP call is blocking, so each attempt runs on
//! tokio's blocking pool and the orchestrating task stays responsive.

use crate::config::ArtpackConfig;
use crate::credentials::CredentialStore;
use crate::provider::*;
use artpack_core::{GeneratedImage, GenerationError, GenerationErrorKind};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";
/// Inline 2k images arrive base64-encoded and can exceed ureq's default body limit
const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Gemini provider for image generation
pub struct GeminiProvider {
    credentials: CredentialStore,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiProvider {
    /// Create a new GeminiProvider from config.
    ///
    /// A key found in config seeds the credential store when nothing has been
    /// selected yet; the store stays authoritative afterwards.
    pub fn from_config(config: &ArtpackConfig, credentials: CredentialStore) -> Self {
        if !credentials.has_selected_key() {
            if let Some(key) = config.api_key("gemini") {
                credentials.select_key(key);
            }
        }

        Self {
            credentials,
            api_url: config
                .api_url("gemini")
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config
                .model("gemini")
                .unwrap_or(DEFAULT_GEMINI_MODEL)
                .to_string(),
            timeout: config.request_timeout(),
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_url, model_path)
    }
}

/// Build the `generateContent` request body
pub fn build_payload(request: &GenerateRequest) -> Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": request.prompt }]
        }],
        "generationConfig": {
            "imageConfig": {
                "aspectRatio": request.aspect_ratio.as_str()
            }
        }
    })
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    config.into()
}

fn post_generate(
    endpoint: &str,
    api_key: &str,
    payload: &Value,
    timeout: Duration,
) -> Result<GeneratedImage, GenerationError> {
    // A fresh agent per attempt, so no connection state survives a failure
    let agent = build_agent(timeout);
    let mut response = agent
        .post(endpoint)
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .send_json(payload)
        .map_err(|e| classify_transport_error(&e))?;

    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_RESPONSE_BYTES)
        .read_to_string()
        .map_err(|e| classify_transport_error(&e))?;

    if status >= 400 {
        return Err(parse_error_response(status, &body));
    }
    parse_generate_response(&body)
}

fn classify_transport_error(e: &ureq::Error) -> GenerationError {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => GenerationError::new(
            GenerationErrorKind::ServerError,
            format!("Rpc failed: {}", e),
        ),
        ureq::Error::StatusCode(code) => {
            GenerationError::from_response(*code, None, &format!("HTTP status {}", code))
        }
        other => GenerationError::from_message(format!("Gemini request failed: {}", other)),
    }
}

/// Classify a non-2xx response from its structured error body.
///
/// Falls back to the raw body text when the body is not the usual
/// `{"error": {"code", "message", "status"}}` shape.
pub fn parse_error_response(status: u16, body: &str) -> GenerationError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let rpc_status = error
        .and_then(|e| e.get("status"))
        .and_then(Value::as_str);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body.trim()));

    GenerationError::from_response(status, rpc_status, &message)
}

/// Extract the first inline image from a `generateContent` response
pub fn parse_generate_response(body: &str) -> Result<GeneratedImage, GenerationError> {
    let response: Value = serde_json::from_str(body).map_err(|e| {
        GenerationError::new(
            GenerationErrorKind::ServerError,
            format!("Invalid JSON from Gemini: {}", e),
        )
    })?;

    let parts = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array);

    for part in parts.into_iter().flatten() {
        let inline = part.get("inlineData").or_else(|| part.get("inline_data"));
        let Some(inline) = inline else {
            continue;
        };
        let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
        if data.is_empty() {
            continue;
        }
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        return Ok(GeneratedImage::new(mime_type, data));
    }

    Err(GenerationError::no_image())
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn health_check(&self) -> ProviderStatus {
        if self.credentials.has_selected_key() {
            ProviderStatus::Available
        } else {
            ProviderStatus::NoApiKey
        }
    }

    async fn request_image(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        let api_key = self.credentials.current().ok_or_else(|| {
            GenerationError::new(
                GenerationErrorKind::InvalidCredential,
                "No Gemini API key selected",
            )
        })?;
        let endpoint = self.endpoint();
        let payload = build_payload(request);
        let timeout = self.timeout;

        tracing::debug!(%endpoint, aspect_ratio = %request.aspect_ratio, "sending generateContent");

        tokio::task::spawn_blocking(move || post_generate(&endpoint, &api_key, &payload, timeout))
            .await
            .map_err(|e| {
                GenerationError::new(
                    GenerationErrorKind::Unknown,
                    format!("Gemini request task failed: {}", e),
                )
            })?
    }
}
