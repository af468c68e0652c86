//! Core type definitions for radiograph triage
//!
//! This module provides the fundamental types used throughout the library:
//! - [`ViewCode`]: Radiographic projection (PA, Lateral, Oblique)
//! - [`Side`]: Left/right marker inferred for an image
//! - [`AngulationMethod`]: Source of an angulation measurement
//! - [`DecisionTier`]: Three-band triage outcome
//! - [`ImageAsset`], [`ClassifiedImage`], [`OrientedImage`]: an upload as it moves through the stages
//! - [`DecisionThresholds`], [`TriageConfig`]: request-independent configuration
//! - [`TriageReport`]: the assembled response

mod asset;
mod config;
mod enums;
mod report;

pub use asset::{ClassifiedImage, ImageAsset, Metadata, OrientedImage};
pub use config::{
    parse_quality_min, DecisionThresholds, TriageConfig, DEFAULT_LIKELY_THRESHOLD, DEFAULT_QUALITY_MIN,
    DEFAULT_VISION_TIMEOUT, DEFAULT_YES_THRESHOLD,
};
pub use enums::{AngulationMethod, DecisionTier, QualityLabel, Side, ViewCode};
pub use report::{Findings, Metrics, TriageReport, ViewsSummary};
