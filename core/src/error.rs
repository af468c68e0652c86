use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Error types for triage operations
#[derive(Error, Debug)]
pub enum TriageError {
    /// Malformed request input (no files, bad checklist JSON)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Overall image quality below the acceptance gate
    #[error("Quality: {label}. {tip}")]
    QualityRejected { label: String, tip: String },

    /// Image bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Image could not be re-encoded after rotation
    #[error("Encode error: {0}")]
    Encode(String),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// Vision assessment service failed or returned an unusable body
    #[error("Upstream vision service error: {0}")]
    Upstream(String),

    /// Vision assessment service did not answer in time
    #[error("Upstream vision service timed out after {0}s")]
    UpstreamTimeout(u64),

    /// Background task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TriageError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, TriageError::Upstream(_) | TriageError::UpstreamTimeout(_))
    }
}

impl TriageError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TriageError::Validation(_) => StatusCode::BAD_REQUEST,
            TriageError::QualityRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TriageError::Upstream(_) => StatusCode::BAD_GATEWAY,
            TriageError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            TriageError::Decode(_)
            | TriageError::Encode(_)
            | TriageError::Dicom(_)
            | TriageError::Internal(_)
            | TriageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TriageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<image::ImageError> for TriageError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) => TriageError::Encode(format!("{}", e)),
            _ => TriageError::Decode(format!("{}", e)),
        }
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for TriageError {
    fn from(e: dicom_object::ReadError) -> Self {
        TriageError::Dicom(format!("{}", e))
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(e: serde_json::Error) -> Self {
        TriageError::Validation(format!("{}", e))
    }
}

impl From<reqwest::Error> for TriageError {
    fn from(e: reqwest::Error) -> Self {
        TriageError::Upstream(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_rejected_message() {
        let err = TriageError::QualityRejected {
            label: "Poor".to_string(),
            tip: "Retake with the hand flat on the detector.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Quality: Poor. Retake with the hand flat on the detector."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(TriageError::UpstreamTimeout(30).is_retryable());
        assert!(TriageError::Upstream("502".to_string()).is_retryable());
        assert!(!TriageError::Validation("no files".to_string()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TriageError::Validation("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TriageError::QualityRejected {
                label: "Poor".to_string(),
                tip: "t".to_string()
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(TriageError::Upstream("x".to_string()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(TriageError::UpstreamTimeout(30).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            TriageError::Dicom("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
