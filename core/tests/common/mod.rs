//! Shared fakes and fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use fractriage_core::triage::{ImageQuality, QualityMetrics};
use fractriage_core::{
    ImageAsset, OrientedImage, QualityAssessor, QualityLabel, QualityReport, Result, TriageError,
    VisionAssessment, VisionAssessor,
};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Grayscale PNG with a bright vertical band; `seed` makes the bytes unique
pub fn png(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, _| {
        if x > width / 3 && x < 2 * width / 3 {
            Luma([255 - seed])
        } else {
            Luma([0])
        }
    });
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn asset(name: &str, bytes: Vec<u8>) -> ImageAsset {
    ImageAsset::new(name, bytes, "image/png")
}

pub fn asset_with(name: &str, bytes: Vec<u8>, metadata: serde_json::Value) -> ImageAsset {
    asset(name, bytes).with_metadata(metadata.as_object().cloned().unwrap_or_default())
}

/// Quality assessor returning the same verdict for every image
pub struct FixedQuality {
    pub score: f64,
    pub label: QualityLabel,
}

impl FixedQuality {
    pub fn good() -> Arc<Self> {
        Arc::new(Self {
            score: 0.9,
            label: QualityLabel::Good,
        })
    }

    pub fn fair() -> Arc<Self> {
        Arc::new(Self {
            score: 0.55,
            label: QualityLabel::Fair,
        })
    }

    pub fn poor() -> Arc<Self> {
        Arc::new(Self {
            score: 0.2,
            label: QualityLabel::Poor,
        })
    }

    fn verdict(&self, name: &str) -> ImageQuality {
        ImageQuality {
            name: name.to_string(),
            quality_score: self.score,
            label: self.label,
            tip: "Retake with the hand flat on the detector.".to_string(),
            metrics: QualityMetrics::default(),
        }
    }
}

impl QualityAssessor for FixedQuality {
    fn assess(&self, images: &[ImageAsset]) -> QualityReport {
        QualityReport {
            per_image: images.iter().map(|a| self.verdict(&a.name)).collect(),
            overall: self.verdict("overall"),
            threshold: 0.4,
        }
    }
}

/// Vision assessor with a canned reply that counts its calls
pub struct FakeVision {
    pub reply: std::result::Result<VisionAssessment, String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub last_batch: std::sync::Mutex<Vec<String>>,
}

impl FakeVision {
    pub fn replying(reply: VisionAssessment) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_batch: Default::default(),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_batch: Default::default(),
        })
    }

    pub fn slow(reply: VisionAssessment, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply),
            delay,
            calls: AtomicUsize::new(0),
            last_batch: Default::default(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionAssessor for FakeVision {
    async fn assess(&self, images: &[OrientedImage]) -> Result<VisionAssessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_batch.lock().unwrap() = images.iter().map(|i| i.name().to_string()).collect();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone().map_err(TriageError::Upstream)
    }
}

pub fn assessment(confidence: f64, angulation: Option<f64>) -> VisionAssessment {
    VisionAssessment {
        fracture_present: true,
        bone: Some("radius".to_string()),
        region: Some("distal".to_string()),
        suspected_type: Some("Colles".to_string()),
        angulation_deg: angulation,
        confidence_0_1: confidence,
        red_flags: vec![],
    }
}
