//! Mock provider for offline runs
//!
//! Generates a solid-color PNG sized to the requested aspect ratio without any
//! network calls. The color is derived from the prompt so different assets
//! are told apart at a glance.

use crate::provider::*;
use artpack_core::{GeneratedImage, GenerationError, GenerationErrorKind};
use async_trait::async_trait;
use std::io::Cursor;

/// Long edge of mock images; kept small so packs stay light
const MOCK_LONG_EDGE: u32 = 256;

/// A mock provider that renders placeholder images locally
#[derive(Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> ProviderStatus {
        ProviderStatus::Available
    }

    async fn request_image(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        let (w, h) = request.aspect_ratio.dimensions();
        let scale = w.max(h) / MOCK_LONG_EDGE;
        let bytes = render_solid_png(&request.prompt, w / scale, h / scale)?;
        Ok(GeneratedImage::from_bytes("image/png", &bytes))
    }
}

/// Render a solid-color PNG whose color is a hash of `seed`
fn render_solid_png(seed: &str, width: u32, height: u32) -> Result<Vec<u8>, GenerationError> {
    let hash_val = seed
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let pixel = image::Rgba([
        ((hash_val >> 16) & 0xFF) as u8,
        ((hash_val >> 8) & 0xFF) as u8,
        (hash_val & 0xFF) as u8,
        255,
    ]);

    let img = image::RgbaImage::from_pixel(width, height, pixel);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).map_err(|e| {
        GenerationError::new(
            GenerationErrorKind::Unknown,
            format!("Failed to encode mock PNG: {}", e),
        )
    })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artpack_core::AspectRatio;

    fn request(prompt: &str, aspect_ratio: AspectRatio) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.to_string(),
            aspect_ratio,
        }
    }

    #[test]
    fn test_mock_provider_health() {
        assert_eq!(MockProvider::new().health_check(), ProviderStatus::Available);
    }

    #[tokio::test]
    async fn test_mock_generates_png_with_aspect_ratio() {
        let provider = MockProvider::new();
        let image = provider
            .request_image(&request("world map", AspectRatio::Portrait9x16))
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/png");

        let decoded = image::load_from_memory(&image.decode().unwrap()).unwrap();
        assert_eq!(decoded.height(), 256);
        assert_eq!(decoded.width(), 144);
    }

    #[tokio::test]
    async fn test_mock_color_follows_prompt() {
        let provider = MockProvider::new();
        let red = provider
            .request_image(&request("red bubble", AspectRatio::Square))
            .await
            .unwrap();
        let red_again = provider
            .request_image(&request("red bubble", AspectRatio::Square))
            .await
            .unwrap();
        let blue = provider
            .request_image(&request("blue bubble", AspectRatio::Square))
            .await
            .unwrap();
        assert_eq!(red, red_again);
        assert_ne!(red, blue);
    }
}
