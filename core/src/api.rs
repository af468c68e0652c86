//! HTTP surface
//!
//! `POST /api/triage` accepts a multipart upload and returns a
//! [`TriageReport`]; `GET /health` reports liveness.

use crate::error::{Result, TriageError};
use crate::triage::{RedFlagChecklist, TriagePipeline, TriageRequest};
use crate::types::{ImageAsset, Metadata, TriageReport};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Field names accepted for image parts
pub const FILE_FIELDS: [&str; 3] = ["files[]", "files", "file"];
pub const CHECKLIST_FIELD: &str = "redFlagChecklist";
pub const METADATA_FIELD: &str = "metadata";

pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

pub type AppState = Arc<TriagePipeline>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Builds the application router
///
/// `max_upload_bytes` bounds the whole multipart body.
pub fn router(pipeline: Arc<TriagePipeline>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/triage", post(triage))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(pipeline)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/triage
pub async fn triage(State(pipeline): State<AppState>, multipart: Multipart) -> Result<Json<TriageReport>> {
    let request = read_upload(multipart).await?;
    info!(
        "Received triage upload: {} images, checklist {:?}",
        request.images.len(),
        request.checklist
    );
    let report = pipeline.run(request).await?;
    Ok(Json(report))
}

/// Collects image parts, the checklist and per-file metadata
async fn read_upload(mut multipart: Multipart) -> Result<TriageRequest> {
    let mut images = Vec::new();
    let mut checklist = RedFlagChecklist::default();
    let mut metadata: HashMap<String, Metadata> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TriageError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if FILE_FIELDS.contains(&field_name.as_str()) {
            let name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("upload-{}", images.len() + 1));
            let declared = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| TriageError::Validation(format!("could not read {}: {}", name, e)))?;
            if bytes.is_empty() {
                debug!("Skipping empty part {}", name);
                continue;
            }
            let mime = declared
                .filter(|m| m != "application/octet-stream")
                .unwrap_or_else(|| mime_from_name(&name).to_string());
            images.push(ImageAsset::new(name, bytes.to_vec(), mime));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| TriageError::Validation(format!("could not read {}: {}", field_name, e)))?;
        match field_name.as_str() {
            CHECKLIST_FIELD if !text.trim().is_empty() => {
                checklist = serde_json::from_str(&text)?;
            }
            METADATA_FIELD if !text.trim().is_empty() => {
                metadata = parse_metadata(&text)?;
            }
            _ => debug!("Ignoring multipart field {:?}", field_name),
        }
    }

    if images.is_empty() {
        return Err(TriageError::Validation("No images uploaded".to_string()));
    }

    Ok(TriageRequest {
        images: attach_metadata(images, &metadata),
        checklist,
    })
}

/// Gives every upload the metadata entry matching its file name
///
/// Uploads that share a name all receive the same entry.
fn attach_metadata(
    images: Vec<ImageAsset>,
    metadata: &HashMap<String, Metadata>,
) -> Vec<ImageAsset> {
    images
        .into_iter()
        .map(|asset| match metadata.get(&asset.name) {
            Some(map) => asset.with_metadata(map.clone()),
            None => asset,
        })
        .collect()
}

/// Parses `{ "<file name>": { ... } }`; non-object entries are ignored
fn parse_metadata(text: &str) -> Result<HashMap<String, Metadata>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(entries) = value else {
        return Err(TriageError::Validation(
            "metadata must be a JSON object keyed by file name".to_string(),
        ));
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, entry)| match entry {
            Value::Object(map) => Some((name, map)),
            _ => None,
        })
        .collect())
}

/// Guesses a MIME type from the file extension
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("dcm") | Some("dicom") => "application/dicom",
        _ => "application/octet-stream",
    }
}
