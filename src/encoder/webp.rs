//! WebP encoder implementation using libwebp

use crate::{
    encoder::ImageEncoder,
    error::{EncodingError, EncodingResult},
    types::CapturedImage,
};

use std::time::Instant;

/// Quality at which WebP switches to lossless mode
const LOSSLESS_QUALITY: u8 = 100;

/// WebP encoder using the webp crate
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPEncoder;

impl WebPEncoder {
    /// Encode an image to WebP format
    fn encode_rgba(&self, image: &CapturedImage, quality: u8) -> EncodingResult<Vec<u8>> {
        // Validate image dimensions
        if image.width() == 0 || image.height() == 0 {
            return Err(EncodingError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        let start_time = Instant::now();
        let rgba = image.to_rgba8();
        let encoder = webp::Encoder::from_rgba(&rgba, image.width(), image.height());
        let encoded = if quality >= LOSSLESS_QUALITY {
            encoder.encode_lossless()
        } else {
            encoder.encode(quality as f32)
        };

        if encoded.is_empty() {
            return Err(EncodingError::EncodingFailed {
                format: "WebP",
                message: "libwebp returned no data".to_string(),
            });
        }

        log::debug!(
            "[WebP] quality {} in {:.1}ms",
            quality,
            start_time.elapsed().as_secs_f64() * 1000.0
        );
        Ok(encoded.to_vec())
    }
}

impl ImageEncoder for WebPEncoder {
    fn encode(&self, image: &CapturedImage, quality: u8) -> EncodingResult<Vec<u8>> {
        self.encode_rgba(image, quality)
    }

    fn name(&self) -> &str {
        "WebPEncoder"
    }
}
