//! Confidence calibration and decision tiers
//!
//! The model's raw confidence is discounted for weak image quality and
//! incomplete view sets, nudged upward by red flags, and mapped to a tier.

use crate::types::{DecisionThresholds, DecisionTier};
use serde::Serialize;

/// Share of the raw confidence kept even at zero image quality
pub const QUALITY_FLOOR: f64 = 0.5;

/// Multiplier applied when no Lateral view was uploaded
pub const MISSING_LATERAL_FACTOR: f64 = 0.5;

/// Multiplier applied to single-view studies
pub const SINGLE_VIEW_FACTOR: f64 = 0.9;

/// Additive bonus per red flag
pub const RED_FLAG_STEP: f64 = 0.025;

/// Red flags beyond this count add nothing
pub const RED_FLAG_CAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationInput {
    pub confidence_raw: f64,
    pub quality_score: f64,
    pub has_lateral: bool,
    pub view_count: usize,
    pub red_flag_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationResult {
    pub confidence_calibrated: f64,
    pub decision_tier: DecisionTier,
}

/// Clamps into [0, 1]; NaN becomes 0
pub(crate) fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Calibrates a raw confidence and assigns its decision tier
///
/// Out-of-range and NaN inputs are clamped rather than rejected.
pub fn apply_calibration(input: &CalibrationInput, thresholds: &DecisionThresholds) -> CalibrationResult {
    let raw = unit(input.confidence_raw);
    let quality = unit(input.quality_score);

    let mut score = raw * (QUALITY_FLOOR + (1.0 - QUALITY_FLOOR) * quality);
    if !input.has_lateral {
        score *= MISSING_LATERAL_FACTOR;
    }
    if input.view_count <= 1 {
        score *= SINGLE_VIEW_FACTOR;
    }
    score += RED_FLAG_STEP * input.red_flag_count.min(RED_FLAG_CAP) as f64;

    let confidence_calibrated = unit(score);
    CalibrationResult {
        confidence_calibrated,
        decision_tier: tier_for(confidence_calibrated, thresholds),
    }
}

/// Maps a calibrated confidence onto the three decision bands
pub fn tier_for(confidence: f64, thresholds: &DecisionThresholds) -> DecisionTier {
    if confidence >= thresholds.yes() {
        DecisionTier::Yes
    } else if confidence >= thresholds.likely() {
        DecisionTier::Likely
    } else {
        DecisionTier::Unlikely
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(1.5, 1.0)]
    #[case(-0.1, 0.0)]
    #[case(0.25, 0.25)]
    fn test_unit(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(unit(value), expected);
    }

    fn input(raw: f64, quality: f64, has_lateral: bool, views: usize, flags: usize) -> CalibrationInput {
        CalibrationInput {
            confidence_raw: raw,
            quality_score: quality,
            has_lateral,
            view_count: views,
            red_flag_count: flags,
        }
    }

    #[test]
    fn test_reference_fixture() {
        let thresholds = DecisionThresholds::from_values(None, Some("0.4"));
        let result = apply_calibration(&input(0.8, 1.4, false, 3, 99), &thresholds);
        assert!((result.confidence_calibrated - 0.45).abs() < 1e-9);
        assert_eq!(result.decision_tier, DecisionTier::Likely);
    }

    #[test]
    fn test_complete_study_high_confidence_is_yes() {
        let result = apply_calibration(&input(0.9, 0.9, true, 2, 0), &DecisionThresholds::default());
        // 0.9 * (0.5 + 0.45) = 0.855
        assert!((result.confidence_calibrated - 0.855).abs() < 1e-9);
        assert_eq!(result.decision_tier, DecisionTier::Yes);
    }

    #[test]
    fn test_single_view_penalty() {
        let two = apply_calibration(&input(0.6, 1.0, true, 2, 0), &DecisionThresholds::default());
        let one = apply_calibration(&input(0.6, 1.0, true, 1, 0), &DecisionThresholds::default());
        assert!((one.confidence_calibrated - two.confidence_calibrated * SINGLE_VIEW_FACTOR).abs() < 1e-9);
    }

    #[rstest]
    #[case(f64::NAN, 0.5)]
    #[case(-3.0, 0.5)]
    #[case(0.5, f64::NAN)]
    #[case(7.0, -1.0)]
    fn test_degenerate_inputs_stay_in_range(#[case] raw: f64, #[case] quality: f64) {
        let result = apply_calibration(&input(raw, quality, true, 3, 1), &DecisionThresholds::default());
        assert!((0.0..=1.0).contains(&result.confidence_calibrated));
    }

    #[test]
    fn test_red_flags_capped() {
        let t = DecisionThresholds::default();
        let two = apply_calibration(&input(0.0, 0.0, true, 2, 2), &t);
        let many = apply_calibration(&input(0.0, 0.0, true, 2, 50), &t);
        assert_eq!(two.confidence_calibrated, many.confidence_calibrated);
        assert!((two.confidence_calibrated - 2.0 * RED_FLAG_STEP).abs() < 1e-12);
    }

    #[test]
    fn test_tier_is_monotonic_in_confidence() {
        let t = DecisionThresholds::new(0.7, 0.4);
        let mut previous = DecisionTier::Unlikely;
        for step in 0..=100 {
            let tier = tier_for(f64::from(step) / 100.0, &t);
            assert!(tier >= previous);
            previous = tier;
        }
        assert_eq!(tier_for(0.7, &t), DecisionTier::Yes);
        assert_eq!(tier_for(0.4, &t), DecisionTier::Likely);
        assert_eq!(tier_for(0.39, &t), DecisionTier::Unlikely);
    }

    #[test]
    fn test_calibration_monotonic_in_raw_confidence() {
        let t = DecisionThresholds::default();
        let low = apply_calibration(&input(0.3, 0.8, true, 3, 1), &t);
        let high = apply_calibration(&input(0.6, 0.8, true, 3, 1), &t);
        assert!(high.confidence_calibrated > low.confidence_calibrated);
        assert!(high.decision_tier >= low.decision_tier);
    }
}
