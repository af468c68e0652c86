use crate::error::{Result, TriageError};
use crate::extraction::enrich_with_dicom_hints;
use crate::imaging::{clamp_angle, estimate_batch, normalize, ImageCodec, ImageRsCodec};
use crate::intake::{dedup, DedupResult};
use crate::types::{
    AngulationMethod, DecisionTier, Findings, ImageAsset, Metrics, TriageConfig, TriageReport,
};
use log::{debug, info};
use std::sync::Arc;

use super::calibration::{apply_calibration, unit, CalibrationInput};
use super::quality_gate::{check_quality, quality_warnings, QualityAssessor};
use super::red_flags::{aggregate, RedFlagChecklist};
use super::vision::VisionAssessor;

pub const NEXT_STEP_LATERAL: &str =
    "Add a lateral view of the injured hand or wrist and resubmit; angulation cannot be assessed without it.";
pub const NEXT_STEP_URGENT: &str =
    "Red flags present: arrange urgent in-person evaluation.";
pub const NEXT_STEP_YES: &str =
    "Findings consistent with fracture: immobilise and refer to a hand or orthopaedic clinic.";
pub const NEXT_STEP_LIKELY: &str =
    "Possible fracture: splint and arrange clinical review with repeat imaging in 10 to 14 days.";
pub const NEXT_STEP_UNLIKELY: &str =
    "Fracture unlikely: manage symptomatically and re-image if pain or tenderness persists.";

/// One triage submission
#[derive(Debug, Clone, Default)]
pub struct TriageRequest {
    pub images: Vec<ImageAsset>,
    pub checklist: RedFlagChecklist,
}

/// Sequences the triage stages for a single request
///
/// Holds no per-request state; one instance is shared by all handlers.
pub struct TriagePipeline<C = ImageRsCodec> {
    config: TriageConfig,
    quality: Arc<dyn QualityAssessor>,
    vision: Arc<dyn VisionAssessor>,
    codec: C,
}

impl TriagePipeline<ImageRsCodec> {
    pub fn new(
        config: TriageConfig,
        quality: Arc<dyn QualityAssessor>,
        vision: Arc<dyn VisionAssessor>,
    ) -> Self {
        Self::with_codec(config, quality, vision, ImageRsCodec)
    }
}

impl<C> TriagePipeline<C>
where
    C: ImageCodec + Clone + 'static,
{
    pub fn with_codec(
        config: TriageConfig,
        quality: Arc<dyn QualityAssessor>,
        vision: Arc<dyn VisionAssessor>,
        codec: C,
    ) -> Self {
        Self {
            config,
            quality,
            vision,
            codec,
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Runs the full pipeline
    ///
    /// # Errors
    ///
    /// - [`TriageError::Validation`] when no images were supplied
    /// - [`TriageError::QualityRejected`] when the quality gate fails; the
    ///   vision service is not called
    /// - [`TriageError::Upstream`] / [`TriageError::UpstreamTimeout`] when
    ///   the vision call fails or exceeds the configured timeout
    pub async fn run(&self, request: TriageRequest) -> Result<TriageReport> {
        let TriageRequest { images, checklist } = request;
        if images.is_empty() {
            return Err(TriageError::Validation("No images uploaded".to_string()));
        }
        info!("Triage started for {} images", images.len());

        let quality = Arc::clone(&self.quality);
        let (images, quality_report) = blocking(move || {
            let images: Vec<ImageAsset> = images.into_iter().map(enrich_with_dicom_hints).collect();
            let report = quality.assess(&images);
            (images, report)
        })
        .await?;
        check_quality(&quality_report, self.config.quality_min)?;

        let deduped = blocking(move || dedup(&images)).await?;
        let views = deduped.summary();
        let view_count = deduped.view_count();
        let DedupResult { images, .. } = deduped;
        debug!(
            "{} images after dedup, views {:?}",
            images.len(),
            views.views_detected
        );

        let codec = self.codec.clone();
        let orientation = blocking(move || normalize(images, &codec)).await?;

        let codec = self.codec.clone();
        let oriented = orientation.images;
        let (oriented, angulation) = blocking(move || {
            let angulation = estimate_batch(&oriented, &codec);
            (oriented, angulation)
        })
        .await?;

        let timeout = self.config.vision_timeout;
        let assessment = tokio::time::timeout(timeout, self.vision.assess(&oriented))
            .await
            .map_err(|_| TriageError::UpstreamTimeout(timeout.as_secs()))??;

        let red_flags = aggregate(&checklist, &assessment.red_flags);
        let confidence_raw = unit(assessment.confidence_0_1);
        let calibration = apply_calibration(
            &CalibrationInput {
                confidence_raw,
                quality_score: quality_report.overall.quality_score,
                has_lateral: !views.missing_lateral,
                view_count,
                red_flag_count: red_flags.merged.len(),
            },
            &self.config.thresholds,
        );

        let primary = angulation.primary;
        let (angulation_deg, angulation_method) = match primary.angulation_deg {
            Some(deg) => (Some(deg), primary.method),
            None => (
                assessment
                    .angulation_deg
                    .filter(|d| d.is_finite())
                    .map(clamp_angle),
                AngulationMethod::None,
            ),
        };

        let mut warnings = orientation.warnings;
        warnings.extend(quality_warnings(&quality_report));

        let next_step = next_step(
            views.missing_lateral,
            !red_flags.merged.is_empty(),
            calibration.decision_tier,
        );

        info!(
            "Triage finished: tier {} (calibrated {:.3}), {} warnings",
            calibration.decision_tier,
            calibration.confidence_calibrated,
            warnings.len()
        );

        Ok(TriageReport {
            findings: Findings {
                fracture_present: assessment.fracture_present,
                bone: assessment.bone,
                region: assessment.region,
                suspected_type: assessment.suspected_type,
                angulation_deg,
                angulation_method,
                confidence_0_1: confidence_raw,
                confidence_calibrated: calibration.confidence_calibrated,
                decision_tier: calibration.decision_tier,
                red_flags: red_flags.merged,
            },
            metrics: Metrics {
                angulation_deg: primary.angulation_deg,
                angulation_method: primary.method,
                quality_score: quality_report.overall.quality_score,
                rotation_applied: orientation.rotation_applied,
            },
            views,
            warnings,
            next_step: next_step.to_string(),
        })
    }
}

/// Guidance shown beneath the findings
pub fn next_step(missing_lateral: bool, has_red_flags: bool, tier: DecisionTier) -> &'static str {
    if missing_lateral {
        return NEXT_STEP_LATERAL;
    }
    if has_red_flags {
        return NEXT_STEP_URGENT;
    }
    match tier {
        DecisionTier::Yes => NEXT_STEP_YES,
        DecisionTier::Likely => NEXT_STEP_LIKELY,
        DecisionTier::Unlikely => NEXT_STEP_UNLIKELY,
    }
}

/// Runs a CPU-bound stage off the async runtime
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TriageError::Internal(format!("pipeline stage failed: {}", e)))
}
