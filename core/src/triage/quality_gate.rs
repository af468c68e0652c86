use crate::error::{Result, TriageError};
use crate::types::{ImageAsset, QualityLabel};
use log::info;
use serde::{Deserialize, Serialize};

/// Per-dimension quality scores, each in [0, 1] where 1 is best
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub blur: f64,
    pub exposure: f64,
    pub crop: f64,
    pub noise: f64,
}

/// Quality verdict for one image (or the whole batch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQuality {
    pub name: String,
    pub quality_score: f64,
    pub label: QualityLabel,

    /// Human-readable retake advice
    pub tip: String,

    pub metrics: QualityMetrics,
}

/// Output of an [`QualityAssessor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub per_image: Vec<ImageQuality>,
    pub overall: ImageQuality,
    pub threshold: f64,
}

/// Scores upload quality before any expensive work is done
pub trait QualityAssessor: Send + Sync {
    fn assess(&self, images: &[ImageAsset]) -> QualityReport;
}

/// Rejects batches whose overall quality is Poor or below `quality_min`
///
/// # Errors
///
/// Returns [`TriageError::QualityRejected`] carrying the overall label and tip.
pub fn check_quality(report: &QualityReport, quality_min: f64) -> Result<()> {
    let overall = &report.overall;
    let score = if overall.quality_score.is_finite() {
        overall.quality_score
    } else {
        0.0
    };

    if overall.label == QualityLabel::Poor || score < quality_min {
        info!(
            "Rejecting upload: overall quality {} ({:.2} < {:.2} or Poor)",
            overall.label, score, quality_min
        );
        return Err(TriageError::QualityRejected {
            label: overall.label.to_string(),
            tip: overall.tip.clone(),
        });
    }
    Ok(())
}

/// One warning line per image that is not Good
pub fn quality_warnings(report: &QualityReport) -> Vec<String> {
    report
        .per_image
        .iter()
        .filter(|q| q.label != QualityLabel::Good)
        .map(|q| format!("Quality {} on {}: {}", q.label, q.name, q.tip))
        .collect()
}
