//! Luminance-statistics quality scoring
//!
//! A lightweight stand-in for a learned quality model. Scores four
//! dimensions on a sampled grid and blends them into one score.

use crate::triage::{ImageQuality, QualityAssessor, QualityMetrics, QualityReport};
use crate::types::{ImageAsset, QualityLabel, DEFAULT_QUALITY_MIN};
use log::debug;

use super::codec::{ImageCodec, ImageRsCodec};
use super::principal_axis::LUMINANCE_THRESHOLD;

const SAMPLES_PER_SHORT_SIDE: u32 = 256;
const MIN_SIDE_PX: u32 = 32;

const EXPOSURE_WEIGHT: f64 = 0.35;
const BLUR_WEIGHT: f64 = 0.30;
const CROP_WEIGHT: f64 = 0.20;
const NOISE_WEIGHT: f64 = 0.15;

// Mean luminance window considered well exposed
const EXPOSURE_LOW: f64 = 0.15;
const EXPOSURE_HIGH: f64 = 0.75;
// Dynamic range (p95 - p5) needed for full exposure credit
const FULL_CONTRAST_RANGE: f64 = 0.3;
// Edges spanning at most ~2 samples count as sharp
const SHARP_EDGE_RATIO: f64 = 0.5;
const SPIKE_DELTA: f64 = 0.3;
const SPIKE_PENALTY: f64 = 10.0;

const TIP_GOOD: &str = "Image quality is acceptable.";
const TIP_EXPOSURE: &str = "Adjust exposure: the image is too dark, too bright or washed out.";
const TIP_BLUR: &str = "Hold the camera steady and refocus; the image looks blurred.";
const TIP_CROP: &str = "Include the whole hand and wrist with a margin around the edges.";
const TIP_NOISE: &str = "Reduce grain: photograph the film or screen in even light.";
const TIP_UNREADABLE: &str = "Pixel data could not be analysed; quality was not verified.";
const TIP_TOO_SMALL: &str = "Resolution is too low; upload the original radiograph.";
const TIP_EMPTY: &str = "No images were uploaded.";

/// [`QualityAssessor`] scoring blur, exposure, crop and noise from luminance
#[derive(Debug, Clone)]
pub struct HeuristicQualityAssessor<C: ImageCodec = ImageRsCodec> {
    codec: C,
    threshold: f64,
}

impl<C: ImageCodec> HeuristicQualityAssessor<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            threshold: DEFAULT_QUALITY_MIN,
        }
    }

    /// Builder: threshold reported alongside the scores
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn score_image(&self, asset: &ImageAsset) -> ImageQuality {
        let raster = match self.codec.decode(&asset.bytes) {
            Ok(raster) => raster,
            Err(e) => {
                debug!("Quality not verified for {}: {}", asset.name, e);
                return verdict(&asset.name, uniform_metrics(0.5), Some(TIP_UNREADABLE));
            }
        };

        let (width, height) = self.codec.dimensions(&raster);
        if width.min(height) < MIN_SIDE_PX {
            return verdict(&asset.name, uniform_metrics(0.0), Some(TIP_TOO_SMALL));
        }

        let grid = sample_grid(&self.codec, &raster, width, height);
        verdict(&asset.name, grid_metrics(&grid), None)
    }
}

impl<C: ImageCodec> QualityAssessor for HeuristicQualityAssessor<C> {
    fn assess(&self, images: &[ImageAsset]) -> QualityReport {
        let per_image: Vec<ImageQuality> = images.iter().map(|a| self.score_image(a)).collect();
        let overall = summarize(&per_image);
        debug!(
            "Overall quality {:.2} ({}) over {} images",
            overall.quality_score,
            overall.label,
            per_image.len()
        );

        QualityReport {
            per_image,
            overall,
            threshold: self.threshold,
        }
    }
}

fn uniform_metrics(v: f64) -> QualityMetrics {
    QualityMetrics {
        blur: v,
        exposure: v,
        crop: v,
        noise: v,
    }
}

fn blended_score(m: &QualityMetrics) -> f64 {
    EXPOSURE_WEIGHT * m.exposure + BLUR_WEIGHT * m.blur + CROP_WEIGHT * m.crop + NOISE_WEIGHT * m.noise
}

/// Builds a verdict; `tip` overrides the metric-derived advice
fn verdict(name: &str, metrics: QualityMetrics, tip: Option<&str>) -> ImageQuality {
    let quality_score = blended_score(&metrics).clamp(0.0, 1.0);
    let label = QualityLabel::from_score(quality_score);
    let tip = tip.unwrap_or_else(|| advice(label, &metrics));

    ImageQuality {
        name: name.to_string(),
        quality_score,
        label,
        tip: tip.to_string(),
        metrics,
    }
}

/// Advice for the weakest dimension
fn advice(label: QualityLabel, m: &QualityMetrics) -> &'static str {
    if label == QualityLabel::Good {
        return TIP_GOOD;
    }
    [
        (m.exposure, TIP_EXPOSURE),
        (m.blur, TIP_BLUR),
        (m.crop, TIP_CROP),
        (m.noise, TIP_NOISE),
    ]
    .into_iter()
    .min_by(|a, b| a.0.total_cmp(&b.0))
    .map(|(_, tip)| tip)
    .unwrap_or(TIP_GOOD)
}

fn summarize(per_image: &[ImageQuality]) -> ImageQuality {
    if per_image.is_empty() {
        return verdict("overall", uniform_metrics(0.0), Some(TIP_EMPTY));
    }

    let n = per_image.len() as f64;
    let mean = |f: fn(&QualityMetrics) -> f64| per_image.iter().map(|q| f(&q.metrics)).sum::<f64>() / n;
    let metrics = QualityMetrics {
        blur: mean(|m| m.blur),
        exposure: mean(|m| m.exposure),
        crop: mean(|m| m.crop),
        noise: mean(|m| m.noise),
    };
    let quality_score = per_image.iter().map(|q| q.quality_score).sum::<f64>() / n;
    let worst = per_image
        .iter()
        .min_by(|a, b| a.quality_score.total_cmp(&b.quality_score))
        .map(|q| q.tip.clone())
        .unwrap_or_else(|| TIP_GOOD.to_string());
    let label = QualityLabel::from_score(quality_score);

    ImageQuality {
        name: "overall".to_string(),
        quality_score,
        label,
        tip: if label == QualityLabel::Good {
            TIP_GOOD.to_string()
        } else {
            worst
        },
        metrics,
    }
}

fn sample_grid<C: ImageCodec>(codec: &C, raster: &C::Raster, width: u32, height: u32) -> Vec<Vec<f64>> {
    let stride = (width.min(height) / SAMPLES_PER_SHORT_SIDE).max(1) as usize;
    (0..height)
        .step_by(stride)
        .map(|y| {
            (0..width)
                .step_by(stride)
                .map(|x| codec.sample_luminance(raster, x, y))
                .collect()
        })
        .collect()
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let k = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[k]
}

fn grid_metrics(grid: &[Vec<f64>]) -> QualityMetrics {
    let mut values: Vec<f64> = grid.iter().flatten().copied().collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let range = percentile(&values, 0.95) - percentile(&values, 0.05);

    QualityMetrics {
        exposure: exposure_score(mean, range),
        blur: sharpness_score(grid, range),
        crop: crop_score(grid),
        noise: noise_score(grid),
    }
}

fn exposure_score(mean: f64, range: f64) -> f64 {
    let level = if mean < EXPOSURE_LOW {
        mean / EXPOSURE_LOW
    } else if mean > EXPOSURE_HIGH {
        (1.0 - mean) / (1.0 - EXPOSURE_HIGH)
    } else {
        1.0
    };
    (level * (range / FULL_CONTRAST_RANGE).min(1.0)).clamp(0.0, 1.0)
}

/// Edge steepness: Σd² / Σ|d| is the typical step across an edge
fn sharpness_score(grid: &[Vec<f64>], range: f64) -> f64 {
    let (mut sum_abs, mut sum_sq) = (0.0, 0.0);
    let mut add = |d: f64| {
        sum_abs += d.abs();
        sum_sq += d * d;
    };
    for (y, row) in grid.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if let Some(&right) = row.get(x + 1) {
                add(right - v);
            }
            if let Some(&below) = grid.get(y + 1).and_then(|r| r.get(x)) {
                add(below - v);
            }
        }
    }
    if sum_abs == 0.0 || range <= f64::EPSILON {
        return 0.0;
    }
    (sum_sq / sum_abs / range / SHARP_EDGE_RATIO).clamp(0.0, 1.0)
}

/// Penalises anatomy touching the frame border
fn crop_score(grid: &[Vec<f64>]) -> f64 {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    let mut border = 0usize;
    let mut bright = 0usize;
    for (y, row) in grid.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if y == 0 || y + 1 == rows || x == 0 || x + 1 == cols {
                border += 1;
                if v > LUMINANCE_THRESHOLD {
                    bright += 1;
                }
            }
        }
    }
    if border == 0 {
        return 0.0;
    }
    1.0 - bright as f64 / border as f64
}

/// Penalises isolated spikes that differ sharply from their 4-neighbourhood
fn noise_score(grid: &[Vec<f64>]) -> f64 {
    let mut interior = 0usize;
    let mut spikes = 0usize;
    for y in 1..grid.len().saturating_sub(1) {
        for x in 1..grid[y].len().saturating_sub(1) {
            interior += 1;
            let avg = (grid[y - 1][x] + grid[y + 1][x] + grid[y][x - 1] + grid[y][x + 1]) / 4.0;
            if (grid[y][x] - avg).abs() > SPIKE_DELTA {
                spikes += 1;
            }
        }
    }
    if interior == 0 {
        return 1.0;
    }
    (1.0 - SPIKE_PENALTY * spikes as f64 / interior as f64).clamp(0.0, 1.0)
}
