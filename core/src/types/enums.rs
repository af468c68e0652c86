use serde::{Deserialize, Serialize};
use std::fmt;

/// Radiographic projection of a hand/wrist image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewCode {
    #[serde(rename = "PA")]
    Pa,
    Lateral,
    Oblique,
}

impl ViewCode {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ViewCode::Pa => "PA",
            ViewCode::Lateral => "Lateral",
            ViewCode::Oblique => "Oblique",
        }
    }

    /// Checks if angulation can be measured on this view
    pub fn is_lateral(&self) -> bool {
        matches!(self, ViewCode::Lateral)
    }
}

impl fmt::Display for ViewCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Body side marked on a radiograph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Side {
    /// Returns whether this side is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, Side::Unknown)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
            Side::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// How an angulation value was obtained
///
/// Variants are declared in priority order: an earlier method always
/// wins over a later one for the same image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngulationMethod {
    Metadata,
    Landmarks,
    Pca,
    #[default]
    None,
}

impl AngulationMethod {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            AngulationMethod::Metadata => "metadata",
            AngulationMethod::Landmarks => "landmarks",
            AngulationMethod::Pca => "pca",
            AngulationMethod::None => "none",
        }
    }
}

impl fmt::Display for AngulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Coarse triage outcome driving downstream messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DecisionTier {
    Unlikely,
    Likely,
    #[serde(rename = "YES")]
    Yes,
}

impl DecisionTier {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            DecisionTier::Yes => "YES",
            DecisionTier::Likely => "Likely",
            DecisionTier::Unlikely => "Unlikely",
        }
    }
}

impl fmt::Display for DecisionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Image quality band reported by a quality assessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityLabel {
    Poor,
    Fair,
    Good,
}

impl QualityLabel {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            QualityLabel::Poor => "Poor",
            QualityLabel::Fair => "Fair",
            QualityLabel::Good => "Good",
        }
    }

    /// Maps a score in [0, 1] to a band
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            QualityLabel::Good
        } else if score >= 0.4 {
            QualityLabel::Fair
        } else {
            QualityLabel::Poor
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
