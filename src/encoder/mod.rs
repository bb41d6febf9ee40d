//! Image encoding for saved screenshots and catalog thumbnails

pub mod raster;
pub mod thumbnail;
pub mod webp;

pub use raster::RasterEncoder;
pub use thumbnail::{thumbnail_png, THUMBNAIL_MAX_HEIGHT, THUMBNAIL_MAX_WIDTH};
pub use webp::WebPEncoder;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{EncodingError, EncodingResult},
    types::CapturedImage,
};

/// On-disk image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
    Bmp,
    WebP,
}

impl ImageFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::WebP => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for image encoders
pub trait ImageEncoder {
    /// Encode a captured image; `quality` is 1-100 and ignored by lossless formats
    fn encode(&self, image: &CapturedImage, quality: u8) -> EncodingResult<Vec<u8>>;

    /// Get encoder name
    fn name(&self) -> &str;
}

/// Encode `image` in `format`
pub fn encode(image: &CapturedImage, format: ImageFormat, quality: u8) -> EncodingResult<Vec<u8>> {
    validate_quality(quality)?;

    let encoder: &dyn ImageEncoder = match format {
        ImageFormat::WebP => &WebPEncoder,
        ImageFormat::Png => &RasterEncoder::Png,
        ImageFormat::Jpg => &RasterEncoder::Jpeg,
        ImageFormat::Bmp => &RasterEncoder::Bmp,
    };

    let encoded = encoder.encode(image, quality)?;
    log::debug!(
        "{}: {}x{} -> {} bytes",
        encoder.name(),
        image.width(),
        image.height(),
        encoded.len()
    );
    Ok(encoded)
}

pub(crate) fn validate_quality(quality: u8) -> EncodingResult<()> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(EncodingError::InvalidQuality(quality))
    }
}
