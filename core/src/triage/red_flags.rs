use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const OPEN_WOUND: &str = "Open wound";
pub const NUMBNESS: &str = "Numbness/tingling";
pub const SEVERE_SWELLING: &str = "Severe swelling";

/// Clinician checklist submitted alongside the images
///
/// Missing fields default to `false`; unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedFlagChecklist {
    pub open_cut: bool,
    pub numbness: bool,
    pub severe_swelling: bool,
}

impl RedFlagChecklist {
    /// Labels for the ticked items, in checklist order
    pub fn labels(&self) -> Vec<String> {
        [
            (self.open_cut, OPEN_WOUND),
            (self.numbness, NUMBNESS),
            (self.severe_swelling, SEVERE_SWELLING),
        ]
        .into_iter()
        .filter(|(ticked, _)| *ticked)
        .map(|(_, label)| label.to_string())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlagSet {
    /// Checklist labels followed by external flags, deduplicated
    pub merged: Vec<String>,
    pub checklist_flags: Vec<String>,
}

/// Merges checklist-derived and externally reported red flags
///
/// Comparison ignores case and surrounding whitespace; the first spelling
/// seen is kept. Blank labels are dropped.
pub fn aggregate(checklist: &RedFlagChecklist, external: &[String]) -> RedFlagSet {
    let checklist_flags = checklist.labels();

    let mut seen = HashSet::new();
    let merged = checklist_flags
        .iter()
        .chain(external)
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .filter(|label| seen.insert(label.to_lowercase()))
        .map(str::to_string)
        .collect();

    RedFlagSet {
        merged,
        checklist_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_checklist_labels_in_order() {
        let checklist = RedFlagChecklist {
            open_cut: true,
            numbness: false,
            severe_swelling: true,
        };
        assert_eq!(checklist.labels(), strings(&[OPEN_WOUND, SEVERE_SWELLING]));
    }

    #[test]
    fn test_checklist_deserialize_partial_and_unknown() {
        let checklist: RedFlagChecklist =
            serde_json::from_str(r#"{"numbness": true, "fever": true}"#).unwrap();
        assert_eq!(
            checklist,
            RedFlagChecklist {
                numbness: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_merge_dedups_case_insensitively() {
        let checklist = RedFlagChecklist {
            open_cut: true,
            ..Default::default()
        };
        let set = aggregate(
            &checklist,
            &strings(&["open WOUND", "Deformity", "  ", "deformity", "Pallor"]),
        );
        assert_eq!(set.merged, strings(&[OPEN_WOUND, "Deformity", "Pallor"]));
        assert_eq!(set.checklist_flags, strings(&[OPEN_WOUND]));
    }

    #[test]
    fn test_external_only() {
        let set = aggregate(&RedFlagChecklist::default(), &strings(&["Tenting of skin"]));
        assert_eq!(set.merged, strings(&["Tenting of skin"]));
        assert!(set.checklist_flags.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(aggregate(&RedFlagChecklist::default(), &[]), RedFlagSet::default());
    }
}
