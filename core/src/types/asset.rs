use super::{Side, ViewCode};
use serde_json::Value;

/// Free-form per-image metadata supplied by the client or lifted from DICOM tags
pub type Metadata = serde_json::Map<String, Value>;

/// An uploaded radiograph
///
/// Immutable once ingested; later stages wrap it rather than mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// Original file name as uploaded
    pub name: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,

    /// MIME type reported by the client (or sniffed)
    pub mime: String,

    /// Optional metadata map; empty when none was supplied
    pub metadata: Metadata,
}

impl ImageAsset {
    /// Creates an asset without metadata
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime: mime.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder: attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns a trimmed, non-empty string metadata value
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns a finite numeric metadata value
    ///
    /// Accepts JSON numbers and strings holding a number, since multipart
    /// clients frequently stringify everything.
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        let value = match self.metadata.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }
}

/// An asset tagged with its projection and content hash
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedImage {
    pub asset: ImageAsset,
    pub view: ViewCode,

    /// Hex-encoded SHA-256 of the original bytes
    pub content_hash: String,
}

/// A classified image after orientation correction and side detection
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedImage {
    pub classified: ClassifiedImage,

    /// Bytes to use downstream (rotated and re-encoded when `rotated`)
    pub bytes: Vec<u8>,

    /// MIME type of `bytes`
    pub mime: String,

    pub side: Side,
    pub rotated: bool,
}

impl OrientedImage {
    /// Wraps a classified image without changing its pixels
    pub fn unrotated(classified: ClassifiedImage, side: Side) -> Self {
        Self {
            bytes: classified.asset.bytes.clone(),
            mime: classified.asset.mime.clone(),
            classified,
            side,
            rotated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.classified.asset.name
    }

    pub fn view(&self) -> ViewCode {
        self.classified.view
    }

    pub fn asset(&self) -> &ImageAsset {
        &self.classified.asset
    }
}
