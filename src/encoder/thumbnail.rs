//! Catalog thumbnails

use image::imageops::{self, FilterType};

use crate::{
    encoder::{ImageEncoder, RasterEncoder},
    error::{EncodingError, EncodingResult},
    types::{CapturedImage, PixelFormat},
};

pub const THUMBNAIL_MAX_WIDTH: u32 = 200;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 150;

/// Dimensions that fit `width`x`height` into the box, keeping aspect ratio.
/// Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fit = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// PNG thumbnail no larger than `max_width`x`max_height`
pub fn thumbnail_png(
    image: &CapturedImage,
    max_width: u32,
    max_height: u32,
) -> EncodingResult<Vec<u8>> {
    if max_width == 0 || max_height == 0 {
        return Err(EncodingError::InvalidDimensions {
            width: max_width,
            height: max_height,
        });
    }

    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
    if (width, height) == (image.width(), image.height()) {
        return RasterEncoder::Png.encode(image, 100);
    }

    let resized = imageops::resize(&image.to_rgba_image(), width, height, FilterType::Triangle);
    let (width, height) = resized.dimensions();
    let scaled = CapturedImage::new(resized.into_raw(), width, height, PixelFormat::RGBA8)
        .map_err(|e| EncodingError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;
    RasterEncoder::Png.encode(&scaled, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_preserves_aspect() {
        assert_eq!(fit_within(1600, 900, 200, 150), (200, 113));
        assert_eq!(fit_within(900, 1600, 200, 150), (84, 150));
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_within(120, 40, 200, 150), (120, 40));
    }

    #[test]
    fn test_fit_keeps_one_pixel() {
        assert_eq!(fit_within(10_000, 1, 200, 150), (200, 1));
    }

    #[test]
    fn test_thumbnail_dimensions() {
        let image = CapturedImage::new(vec![255; 800 * 400 * 4], 800, 400, PixelFormat::RGBA8).unwrap();
        let png = thumbnail_png(&image, THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }
}
