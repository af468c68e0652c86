//! Local-only analysis of a study, without the vision call
//!
//! Runs the same quality gate, deduplication, orientation and angulation
//! stages as [`TriagePipeline`](super::TriagePipeline) so an operator can
//! check an upload before submitting it.

use crate::extraction::enrich_with_dicom_hints;
use crate::imaging::{estimate_batch, normalize, AngulationResult, ImageCodec};
use crate::intake::dedup;
use crate::types::{AngulationMethod, ImageAsset, Side, TriageConfig, ViewCode, ViewsSummary};
use serde::Serialize;

use super::quality_gate::{check_quality, quality_warnings, QualityAssessor, QualityReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreflightImage {
    pub name: String,
    pub view: ViewCode,
    pub side: Side,
    pub rotated: bool,
    pub angulation_deg: Option<f64>,
    pub angulation_method: AngulationMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReport {
    pub quality: QualityReport,

    /// Gate verdict; `None` when the batch would be accepted
    pub rejection: Option<String>,

    pub views: ViewsSummary,
    pub images: Vec<PreflightImage>,
    pub angulation: AngulationResult,
    pub rotation_applied: bool,
    pub warnings: Vec<String>,
}

impl PreflightReport {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Analyses a batch locally
///
/// Unlike the server path, a failed quality gate does not stop the
/// analysis; the verdict is recorded in [`PreflightReport::rejection`].
pub fn preflight<C: ImageCodec>(
    images: Vec<ImageAsset>,
    quality: &dyn QualityAssessor,
    codec: &C,
    config: &TriageConfig,
) -> PreflightReport {
    let images: Vec<ImageAsset> = images.into_iter().map(enrich_with_dicom_hints).collect();
    let quality_report = quality.assess(&images);
    let rejection = check_quality(&quality_report, config.quality_min)
        .err()
        .map(|e| e.to_string());

    let deduped = dedup(&images);
    let views = deduped.summary();
    let orientation = normalize(deduped.images, codec);
    let angulation = estimate_batch(&orientation.images, codec);

    let per_image = orientation
        .images
        .iter()
        .zip(&angulation.per_image)
        .map(|(img, (_, result))| PreflightImage {
            name: img.name().to_string(),
            view: img.view(),
            side: img.side,
            rotated: img.rotated,
            angulation_deg: result.angulation_deg,
            angulation_method: result.method,
        })
        .collect();

    let mut warnings = orientation.warnings;
    warnings.extend(quality_warnings(&quality_report));

    PreflightReport {
        quality: quality_report,
        rejection,
        views,
        images: per_image,
        angulation: angulation.primary,
        rotation_applied: orientation.rotation_applied,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::testing::{gray_bytes, GrayCodec};
    use crate::imaging::HeuristicQualityAssessor;
    use serde_json::json;

    fn bar(width: u32, height: u32, seed: u8) -> Vec<u8> {
        gray_bytes(width, height, move |x, _| {
            if x > width / 3 && x < 2 * width / 3 {
                255 - seed
            } else {
                0
            }
        })
    }

    #[test]
    fn test_preflight_reports_local_stages() {
        let images = vec![
            ImageAsset::new("left-pa.gray", bar(64, 64, 0), "image/x-gray"),
            ImageAsset::new("left-pa-copy.gray", bar(64, 64, 0), "image/x-gray"),
            ImageAsset::new("lat.gray", bar(64, 64, 1), "image/x-gray").with_metadata(
                json!({"angulation": 18}).as_object().cloned().unwrap(),
            ),
        ];
        let report = preflight(
            images,
            &HeuristicQualityAssessor::new(GrayCodec),
            &GrayCodec,
            &TriageConfig::default(),
        );

        assert!(report.accepted());
        assert_eq!(report.views.duplicates_pruned, 1);
        assert!(!report.views.missing_lateral);
        assert_eq!(report.images.len(), 2);
        assert_eq!(report.images[0].side, Side::Left);
        assert_eq!(report.images[1].view, ViewCode::Lateral);
        assert_eq!(report.angulation.angulation_deg, Some(18.0));
        assert_eq!(report.quality.per_image.len(), 3);
    }

    #[test]
    fn test_preflight_records_rejection() {
        let images = vec![ImageAsset::new("dark.gray", gray_bytes(64, 64, |_, _| 0), "image/x-gray")];
        let report = preflight(
            images,
            &HeuristicQualityAssessor::new(GrayCodec),
            &GrayCodec,
            &TriageConfig::default(),
        );
        assert!(!report.accepted());
        assert!(report.rejection.unwrap().starts_with("Quality: Poor."));
        assert_eq!(report.images.len(), 1);
        assert!(report.views.missing_lateral);
    }
}
