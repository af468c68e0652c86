use std::time::Duration;

/// Default YES threshold used when the configured value is missing or invalid
pub const DEFAULT_YES_THRESHOLD: f64 = 0.70;

/// Default LIKELY threshold used when the configured value is missing or invalid
pub const DEFAULT_LIKELY_THRESHOLD: f64 = 0.40;

/// Default minimum overall quality score accepted by the gate
pub const DEFAULT_QUALITY_MIN: f64 = 0.40;

/// Default upper bound on the vision assessment call
pub const DEFAULT_VISION_TIMEOUT: Duration = Duration::from_secs(30);

/// Decision tier cut-offs on calibrated confidence
///
/// Always satisfies `yes >= likely`, whatever order the raw values
/// were configured in.
///
/// # Example
///
/// ```
/// use fractriage_core::DecisionThresholds;
///
/// // Inverted configuration is corrected rather than rejected
/// let t = DecisionThresholds::from_values(Some("0.3"), Some("0.8"));
/// assert_eq!(t.yes(), 0.8);
/// assert_eq!(t.likely(), 0.3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionThresholds {
    yes: f64,
    likely: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            yes: DEFAULT_YES_THRESHOLD,
            likely: DEFAULT_LIKELY_THRESHOLD,
        }
    }
}

impl DecisionThresholds {
    /// Builds thresholds from two numbers, swapping them if inverted
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            yes: a.max(b),
            likely: a.min(b),
        }
    }

    /// Parses raw configuration strings
    ///
    /// Each value falls back to its own default when missing, unparsable,
    /// non-finite or outside [0, 1].
    pub fn from_values(yes: Option<&str>, likely: Option<&str>) -> Self {
        let yes = parse_threshold(yes).unwrap_or(DEFAULT_YES_THRESHOLD);
        let likely = parse_threshold(likely).unwrap_or(DEFAULT_LIKELY_THRESHOLD);
        Self::new(yes, likely)
    }

    /// Reads `DECISION_THRESHOLD_YES` and `DECISION_THRESHOLD_LIKELY`
    pub fn from_env() -> Self {
        let yes = std::env::var("DECISION_THRESHOLD_YES").ok();
        let likely = std::env::var("DECISION_THRESHOLD_LIKELY").ok();
        Self::from_values(yes.as_deref(), likely.as_deref())
    }

    pub fn yes(&self) -> f64 {
        self.yes
    }

    pub fn likely(&self) -> f64 {
        self.likely
    }
}

fn parse_threshold(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

/// Parses a configured quality minimum, falling back to the default
///
/// Text that is not a finite number in [0, 1] yields [`DEFAULT_QUALITY_MIN`].
pub fn parse_quality_min(raw: Option<&str>) -> f64 {
    parse_threshold(raw).unwrap_or(DEFAULT_QUALITY_MIN)
}

/// Request-independent pipeline configuration
///
/// Parsed once at startup and shared read-only between requests.
///
/// # Example
///
/// ```
/// use fractriage_core::{DecisionThresholds, TriageConfig};
/// use std::time::Duration;
///
/// let config = TriageConfig::default()
///     .with_thresholds(DecisionThresholds::new(0.8, 0.5))
///     .with_quality_min(0.3)
///     .with_vision_timeout(Duration::from_secs(15));
///
/// assert_eq!(config.thresholds.yes(), 0.8);
/// assert_eq!(config.quality_min, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    /// Decision tier cut-offs
    pub thresholds: DecisionThresholds,

    /// Overall quality scores below this are rejected
    pub quality_min: f64,

    /// Upper bound on the vision assessment call
    pub vision_timeout: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            thresholds: DecisionThresholds::default(),
            quality_min: DEFAULT_QUALITY_MIN,
            vision_timeout: DEFAULT_VISION_TIMEOUT,
        }
    }
}

impl TriageConfig {
    /// Builder: set decision thresholds
    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Builder: set the quality gate minimum, clamped to [0, 1]
    pub fn with_quality_min(mut self, quality_min: f64) -> Self {
        self.quality_min = if quality_min.is_finite() {
            quality_min.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY_MIN
        };
        self
    }

    /// Builder: set the vision call timeout
    pub fn with_vision_timeout(mut self, timeout: Duration) -> Self {
        self.vision_timeout = timeout;
        self
    }
}
