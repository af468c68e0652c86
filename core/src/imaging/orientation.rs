use crate::error::Result;
use crate::extraction::{detect_side, parse_side_string, EXPECTED_SIDE_KEY};
use crate::types::{ClassifiedImage, OrientedImage, Side};
use log::{debug, info};

use super::codec::{is_png, EncodeFormat, ImageCodec};

/// Width must exceed height by this factor before an image counts as sideways
pub const SIDEWAYS_ASPECT_RATIO: f64 = 1.1;

/// Quality used when a rotated non-PNG image is re-encoded as JPEG
pub const JPEG_QUALITY: u8 = 90;

/// Warning emitted when known sides disagree across the batch
pub const SIDE_CONFLICT_WARNING: &str = "Left/right markers conflict across uploaded images.";

/// Outcome of orientation correction and side detection for a batch
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationResult {
    pub images: Vec<OrientedImage>,

    /// Whether any image was rotated
    pub rotation_applied: bool,

    pub warnings: Vec<String>,

    /// Detected side per image, in upload order
    pub sides: Vec<(String, Side)>,
}

/// Checks whether a portrait radiograph was captured sideways
pub fn is_sideways(width: u32, height: u32) -> bool {
    f64::from(width) > f64::from(height) * SIDEWAYS_ASPECT_RATIO
}

/// Rotates sideways images, detects side markers and flags conflicts
///
/// Pixel failures never abort the batch: an image that cannot be decoded
/// or re-encoded passes through unrotated.
pub fn normalize<C: ImageCodec>(images: Vec<ClassifiedImage>, codec: &C) -> OrientationResult {
    let mut oriented = Vec::with_capacity(images.len());
    let mut warnings = Vec::new();
    let mut sides = Vec::new();
    let mut known_sides: Vec<Side> = Vec::new();

    for classified in images {
        let side = detect_side(&classified.asset.name, &classified.asset.metadata);

        if let Some(warning) = marker_mismatch(&classified, side) {
            warnings.push(warning);
        }
        if !side.is_unknown() && !known_sides.contains(&side) {
            known_sides.push(side);
        }
        sides.push((classified.asset.name.clone(), side));

        let image = match rotate_if_sideways(&classified, codec) {
            Ok(Some((bytes, mime))) => {
                info!("Rotated sideways image {}", classified.asset.name);
                OrientedImage {
                    classified,
                    bytes,
                    mime,
                    side,
                    rotated: true,
                }
            }
            Ok(None) => OrientedImage::unrotated(classified, side),
            Err(e) => {
                debug!(
                    "Passing {} through unrotated: {}",
                    classified.asset.name, e
                );
                OrientedImage::unrotated(classified, side)
            }
        };
        oriented.push(image);
    }

    if known_sides.len() > 1 {
        warnings.push(SIDE_CONFLICT_WARNING.to_string());
    }

    OrientationResult {
        rotation_applied: oriented.iter().any(|img| img.rotated),
        images: oriented,
        warnings,
        sides,
    }
}

/// Compares the requester's expected side with the detected one
fn marker_mismatch(classified: &ClassifiedImage, detected: Side) -> Option<String> {
    let expected = parse_side_string(classified.asset.metadata_str(EXPECTED_SIDE_KEY)?);
    if expected.is_unknown() || expected == detected {
        return None;
    }
    Some(format!(
        "Marker mismatch on {}: expected {}, detected {}.",
        classified.asset.name, expected, detected
    ))
}

/// Returns re-encoded bytes and MIME type when rotation was needed
fn rotate_if_sideways<C: ImageCodec>(
    classified: &ClassifiedImage,
    codec: &C,
) -> Result<Option<(Vec<u8>, String)>> {
    let raster = codec.decode(&classified.asset.bytes)?;
    let (width, height) = codec.dimensions(&raster);
    if !is_sideways(width, height) {
        return Ok(None);
    }

    let format = if classified.asset.mime == "image/png" || is_png(&classified.asset.bytes) {
        EncodeFormat::Png
    } else {
        EncodeFormat::Jpeg {
            quality: JPEG_QUALITY,
        }
    };

    let rotated = codec.rotate90(&raster);
    let bytes = codec.encode(&rotated, format)?;
    Ok(Some((bytes, format.mime().to_string())))
}
