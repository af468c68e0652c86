use crate::types::{AngulationMethod, ImageAsset, OrientedImage};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::codec::ImageCodec;
use super::principal_axis::{bright_points, principal_axis_angle};

/// Metadata key holding a pre-measured angle in degrees
pub const ANGULATION_KEY: &str = "angulation";

/// Metadata key holding an array of `{x, y}` landmark points
pub const LANDMARKS_KEY: &str = "landmarks";

pub const MAX_ANGULATION_DEG: f64 = 180.0;

/// Angle measured on a single image
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AngulationResult {
    pub angulation_deg: Option<f64>,
    pub method: AngulationMethod,
}

impl AngulationResult {
    pub fn none() -> Self {
        Self::default()
    }

    fn measured(degrees: f64, method: AngulationMethod) -> Self {
        Self {
            angulation_deg: Some(degrees),
            method,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.angulation_deg.is_some()
    }
}

/// Per-image results and the value carried forward for the study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchAngulation {
    pub per_image: Vec<(String, AngulationResult)>,

    /// First measured result over Lateral images in upload order
    pub primary: AngulationResult,
}

type Strategy<C> = fn(&OrientedImage, &C) -> Option<AngulationResult>;

/// Estimates angulation for one image
///
/// Only Lateral views are measured. Strategies run in strict priority
/// order (metadata, landmarks, pixel PCA) and the first success wins.
pub fn estimate<C: ImageCodec>(image: &OrientedImage, codec: &C) -> AngulationResult {
    if !image.view().is_lateral() {
        return AngulationResult::none();
    }

    let chain: [Strategy<C>; 3] = [
        |img, _| from_metadata(img.asset()),
        |img, _| from_landmarks(img.asset()),
        from_pixels,
    ];

    let result = chain
        .iter()
        .find_map(|strategy| strategy(image, codec))
        .unwrap_or_else(AngulationResult::none);
    debug!(
        "Angulation for {}: {:?} via {}",
        image.name(),
        result.angulation_deg,
        result.method
    );
    result
}

/// Estimates every image and picks the study-level value
pub fn estimate_batch<C: ImageCodec>(images: &[OrientedImage], codec: &C) -> BatchAngulation {
    let per_image: Vec<(String, AngulationResult)> = images
        .iter()
        .map(|img| (img.name().to_string(), estimate(img, codec)))
        .collect();

    let primary = per_image
        .iter()
        .map(|(_, result)| *result)
        .find(AngulationResult::is_measured)
        .unwrap_or_else(AngulationResult::none);

    BatchAngulation { per_image, primary }
}

/// Clamps `|degrees|` into [0, 180]
pub fn clamp_angle(degrees: f64) -> f64 {
    degrees.abs().min(MAX_ANGULATION_DEG)
}

fn from_metadata(asset: &ImageAsset) -> Option<AngulationResult> {
    asset
        .metadata_f64(ANGULATION_KEY)
        .map(|deg| AngulationResult::measured(clamp_angle(deg), AngulationMethod::Metadata))
}

fn from_landmarks(asset: &ImageAsset) -> Option<AngulationResult> {
    let points = asset.metadata.get(LANDMARKS_KEY)?.as_array()?;
    let [first, second, ..] = points.as_slice() else {
        return None;
    };
    let (x1, y1) = parse_point(first)?;
    let (x2, y2) = parse_point(second)?;

    let degrees = (y2 - y1).atan2(x2 - x1).to_degrees();
    Some(AngulationResult::measured(
        degrees.clamp(0.0, MAX_ANGULATION_DEG),
        AngulationMethod::Landmarks,
    ))
}

fn parse_point(value: &Value) -> Option<(f64, f64)> {
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn from_pixels<C: ImageCodec>(image: &OrientedImage, codec: &C) -> Option<AngulationResult> {
    let raster = match codec.decode(&image.bytes) {
        Ok(raster) => raster,
        Err(e) => {
            debug!("Skipping pixel angulation for {}: {}", image.name(), e);
            return None;
        }
    };

    let points = bright_points(codec, &raster);
    principal_axis_angle(&points).map(|deg| AngulationResult::measured(deg, AngulationMethod::Pca))
}
