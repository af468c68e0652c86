//! Vision assessment boundary and its HTTP client

use crate::error::{Result, TriageError};
use crate::types::OrientedImage;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Instruction sent with every assessment request
pub const ASSESSMENT_INSTRUCTION: &str = "You are reviewing hand and wrist radiographs. \
Return only JSON with keys fracture_present (boolean), bone, region, suspected_type, \
angulation_deg (number or null), confidence_0_1 (0 to 1) and red_flags (array of strings).";

/// Envelope keys some gateways wrap the model output in
const ENVELOPE_KEYS: [&str; 4] = ["output", "content", "text", "result"];
const MAX_ENVELOPE_DEPTH: usize = 3;

/// Structured findings returned by the vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionAssessment {
    pub fracture_present: bool,

    #[serde(default)]
    pub bone: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub suspected_type: Option<String>,

    #[serde(default)]
    pub angulation_deg: Option<f64>,

    #[serde(default)]
    pub confidence_0_1: f64,

    #[serde(default)]
    pub red_flags: Vec<String>,
}

/// External vision-language assessment of a prepared study
#[async_trait]
pub trait VisionAssessor: Send + Sync {
    async fn assess(&self, images: &[OrientedImage]) -> Result<VisionAssessment>;
}

#[derive(Debug, Serialize)]
struct AssessmentRequest<'a> {
    instruction: &'a str,
    images: Vec<EncodedImage<'a>>,
}

#[derive(Debug, Serialize)]
struct EncodedImage<'a> {
    name: &'a str,
    mime: &'a str,
    view: &'static str,
    data: String,
}

impl<'a> AssessmentRequest<'a> {
    fn new(images: &'a [OrientedImage]) -> Self {
        Self {
            instruction: ASSESSMENT_INSTRUCTION,
            images: images
                .iter()
                .map(|img| EncodedImage {
                    name: img.name(),
                    mime: &img.mime,
                    view: img.view().simple_name(),
                    data: STANDARD.encode(&img.bytes),
                })
                .collect(),
        }
    }
}

/// [`VisionAssessor`] posting base64 images to a JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpVisionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpVisionClient {
    /// Creates a client; `api_key` is sent as a bearer token when present
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Upstream`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> TriageError {
        if e.is_timeout() {
            TriageError::UpstreamTimeout(self.timeout.as_secs())
        } else {
            TriageError::from(e)
        }
    }
}

#[async_trait]
impl VisionAssessor for HttpVisionClient {
    async fn assess(&self, images: &[OrientedImage]) -> Result<VisionAssessment> {
        let payload = AssessmentRequest::new(images);
        debug!(
            "Sending {} images to vision endpoint {}",
            payload.images.len(),
            self.endpoint
        );

        let mut request = self.http_client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!("Vision endpoint returned {}", status);
            return Err(TriageError::Upstream(format!(
                "vision endpoint returned {}",
                status
            )));
        }
        parse_assessment(&body)
    }
}

/// Extracts a [`VisionAssessment`] from a model reply
///
/// Tolerates markdown code fences, prose around the JSON object, and
/// gateway envelopes that carry the object (or its text) under `output`,
/// `content`, `text` or `result`.
///
/// # Errors
///
/// Returns [`TriageError::Upstream`] when no usable object is found.
pub fn parse_assessment(text: &str) -> Result<VisionAssessment> {
    let value = extract_json_object(text)
        .ok_or_else(|| TriageError::Upstream("vision reply contained no JSON object".to_string()))?;
    let value = unwrap_envelope(value, MAX_ENVELOPE_DEPTH);

    serde_json::from_value(value)
        .map_err(|e| TriageError::Upstream(format!("unusable vision reply: {}", e)))
}

fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn unwrap_envelope(value: Value, depth: usize) -> Value {
    if depth == 0 || value.get("fracture_present").is_some() {
        return value;
    }

    let inner = ENVELOPE_KEYS
        .iter()
        .find_map(|key| match value.get(*key) {
            Some(Value::Object(_)) => value.get(*key).cloned(),
            Some(Value::String(s)) => extract_json_object(s),
            _ => None,
        });

    match inner {
        Some(inner) => unwrap_envelope(inner, depth - 1),
        None => value,
    }
}
