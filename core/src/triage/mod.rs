pub mod calibration;
pub mod pipeline;
pub mod preflight;
pub mod quality_gate;
pub mod red_flags;
pub mod vision;

pub use calibration::{apply_calibration, tier_for, CalibrationInput, CalibrationResult};
pub use pipeline::{next_step, TriagePipeline, TriageRequest};
pub use preflight::{preflight, PreflightImage, PreflightReport};
pub use quality_gate::{
    check_quality, quality_warnings, ImageQuality, QualityAssessor, QualityMetrics, QualityReport,
};
pub use red_flags::{aggregate, RedFlagChecklist, RedFlagSet};
pub use vision::{parse_assessment, HttpVisionClient, VisionAssessment, VisionAssessor};
