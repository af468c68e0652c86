use super::{AngulationMethod, DecisionTier, ViewCode};
use serde::Serialize;

/// Clinical findings returned for a triaged study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Findings {
    pub fracture_present: bool,
    pub bone: Option<String>,
    pub region: Option<String>,
    pub suspected_type: Option<String>,

    /// Measured angle when available, otherwise the model's estimate
    pub angulation_deg: Option<f64>,
    pub angulation_method: AngulationMethod,

    /// Model-reported confidence, clamped to [0, 1]
    pub confidence_0_1: f64,
    pub confidence_calibrated: f64,
    pub decision_tier: DecisionTier,

    /// Checklist and model red flags, deduplicated
    pub red_flags: Vec<String>,
}

/// Numeric measurements backing the findings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub angulation_deg: Option<f64>,
    pub angulation_method: AngulationMethod,
    pub quality_score: f64,
    pub rotation_applied: bool,
}

/// Summary of the projections that survived deduplication
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsSummary {
    pub views_detected: Vec<ViewCode>,
    pub missing_lateral: bool,
    pub duplicates_pruned: usize,
}

/// Successful triage response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageReport {
    pub findings: Findings,
    pub metrics: Metrics,
    pub views: ViewsSummary,
    pub warnings: Vec<String>,
    #[serde(rename = "nextStep")]
    pub next_step: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_wire_names() {
        let report = TriageReport {
            findings: Findings {
                fracture_present: true,
                bone: Some("radius".to_string()),
                region: Some("distal".to_string()),
                suspected_type: None,
                angulation_deg: Some(32.0),
                angulation_method: AngulationMethod::Metadata,
                confidence_0_1: 0.9,
                confidence_calibrated: 0.85,
                decision_tier: DecisionTier::Yes,
                red_flags: vec![],
            },
            metrics: Metrics {
                angulation_deg: Some(32.0),
                angulation_method: AngulationMethod::Metadata,
                quality_score: 0.9,
                rotation_applied: false,
            },
            views: ViewsSummary {
                views_detected: vec![ViewCode::Pa, ViewCode::Lateral],
                missing_lateral: false,
                duplicates_pruned: 0,
            },
            warnings: vec![],
            next_step: "Refer".to_string(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["findings"]["decision_tier"], "YES");
        assert_eq!(value["findings"]["angulation_method"], "metadata");
        assert_eq!(value["views"]["viewsDetected"][1], "Lateral");
        assert_eq!(value["views"]["missingLateral"], false);
        assert_eq!(value["views"]["duplicatesPruned"], 0);
        assert_eq!(value["nextStep"], "Refer");
    }
}
