pub mod api;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod intake;
pub mod triage;
pub mod types;

pub use api::{mime_from_name, router};
pub use error::{Result, TriageError};
pub use extraction::{classify, detect_side, is_dicom_bytes, view_from_filename};
pub use imaging::{HeuristicQualityAssessor, ImageCodec, ImageRsCodec};
pub use intake::{dedup, DedupResult};
pub use triage::{
    aggregate, apply_calibration, preflight, HttpVisionClient, PreflightReport, QualityAssessor,
    QualityReport, RedFlagChecklist, TriagePipeline, TriageRequest, VisionAssessment,
    VisionAssessor,
};
pub use types::*;
