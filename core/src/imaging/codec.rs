use crate::error::{Result, TriageError};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, Pixel};
use std::io::Cursor;

/// Target container for re-encoded pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Png,
    Jpeg { quality: u8 },
}

impl EncodeFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            EncodeFormat::Png => "image/png",
            EncodeFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Minimal pixel capability the numeric stages depend on
///
/// Keeps orientation, angulation and quality scoring independent of a
/// concrete image library.
pub trait ImageCodec: Send + Sync {
    type Raster;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Raster>;

    /// (width, height) in pixels
    fn dimensions(&self, raster: &Self::Raster) -> (u32, u32);

    /// Rotates 90° clockwise
    fn rotate90(&self, raster: &Self::Raster) -> Self::Raster;

    /// Luminance at (x, y) normalized to [0, 1]
    fn sample_luminance(&self, raster: &Self::Raster, x: u32, y: u32) -> f64;

    fn encode(&self, raster: &Self::Raster, format: EncodeFormat) -> Result<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate (PNG and JPEG)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageCodec for ImageRsCodec {
    type Raster = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    fn dimensions(&self, raster: &DynamicImage) -> (u32, u32) {
        raster.dimensions()
    }

    fn rotate90(&self, raster: &DynamicImage) -> DynamicImage {
        raster.rotate90()
    }

    fn sample_luminance(&self, raster: &DynamicImage, x: u32, y: u32) -> f64 {
        f64::from(raster.get_pixel(x, y).to_luma()[0]) / 255.0
    }

    fn encode(&self, raster: &DynamicImage, format: EncodeFormat) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match format {
            EncodeFormat::Png => {
                raster.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            }
            EncodeFormat::Jpeg { quality } => {
                // JPEG has no alpha channel and no 16-bit support
                let flattened = match raster.color() {
                    ColorType::L8 | ColorType::Rgb8 => raster.clone(),
                    ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                        DynamicImage::ImageLuma8(raster.to_luma8())
                    }
                    _ => DynamicImage::ImageRgb8(raster.to_rgb8()),
                };
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
                flattened
                    .write_with_encoder(encoder)
                    .map_err(|e| TriageError::Encode(format!("{}", e)))?;
            }
        }
        Ok(buf)
    }
}

/// Checks PNG magic bytes
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x89PNG\r\n\x1a\n")
}
