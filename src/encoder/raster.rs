//! PNG, JPEG and BMP encoding through the `image` crate

use std::io::Cursor;

use crate::{
    encoder::ImageEncoder,
    error::{EncodingError, EncodingResult},
    types::CapturedImage,
};

use image::{codecs::jpeg::JpegEncoder, DynamicImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoder {
    Png,
    /// Alpha is dropped; JPEG has no alpha channel
    Jpeg,
    Bmp,
}

impl RasterEncoder {
    fn format_name(&self) -> &'static str {
        match self {
            RasterEncoder::Png => "PNG",
            RasterEncoder::Jpeg => "JPEG",
            RasterEncoder::Bmp => "BMP",
        }
    }

    fn failed(&self, err: image::ImageError) -> EncodingError {
        EncodingError::EncodingFailed {
            format: self.format_name(),
            message: err.to_string(),
        }
    }
}

impl ImageEncoder for RasterEncoder {
    fn encode(&self, image: &CapturedImage, quality: u8) -> EncodingResult<Vec<u8>> {
        let rgba = image.to_rgba_image();
        let mut buffer = Vec::new();

        match self {
            RasterEncoder::Png => rgba
                .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
                .map_err(|e| self.failed(e))?,
            RasterEncoder::Bmp => rgba
                .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Bmp)
                .map_err(|e| self.failed(e))?,
            RasterEncoder::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                JpegEncoder::new_with_quality(&mut buffer, quality)
                    .encode_image(&rgb)
                    .map_err(|e| self.failed(e))?
            }
        }

        Ok(buffer)
    }

    fn name(&self) -> &str {
        match self {
            RasterEncoder::Png => "PngEncoder",
            RasterEncoder::Jpeg => "JpegEncoder",
            RasterEncoder::Bmp => "BmpEncoder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelFormat;

    #[test]
    fn test_png_keeps_pixels() {
        let data = vec![10, 20, 30, 255, 40, 50, 60, 255];
        let image = CapturedImage::new(data, 2, 1, PixelFormat::RGBA8).unwrap();
        let png = RasterEncoder::Png.encode(&image, 95).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), &vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_jpeg_quality_changes_size() {
        let mut data = Vec::new();
        for i in 0..64 * 64u32 {
            data.extend_from_slice(&[(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i % 256) as u8, 255]);
        }
        let image = CapturedImage::new(data, 64, 64, PixelFormat::RGBA8).unwrap();

        let low = RasterEncoder::Jpeg.encode(&image, 10).unwrap();
        let high = RasterEncoder::Jpeg.encode(&image, 95).unwrap();
        assert!(low.len() < high.len());
    }
}
