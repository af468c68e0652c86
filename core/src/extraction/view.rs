use crate::types::{Metadata, ViewCode};

use super::keywords::match_keyword;

/// Metadata keys that may carry an explicit projection hint, in priority order
pub const VIEW_HINT_KEYS: &[&str] = &["view", "viewPosition", "projection"];

// Oblique before lateral before PA: "lateral oblique" is an oblique view
const VIEW_KEYWORDS: &[(&str, ViewCode)] = &[
    ("oblique", ViewCode::Oblique),
    ("obl", ViewCode::Oblique),
    ("lateral", ViewCode::Lateral),
    ("lat", ViewCode::Lateral),
    ("posteroanterior", ViewCode::Pa),
    ("postero-anterior", ViewCode::Pa),
    ("anteroposterior", ViewCode::Pa),
    ("frontal", ViewCode::Pa),
    ("pa", ViewCode::Pa),
    ("ap", ViewCode::Pa),
];

/// Classifies an image into a projection
///
/// # Algorithm
///
/// 1. Metadata hint (`view`, `viewPosition`, `projection`) if it maps via the keyword table
/// 2. File name matched against the same table
/// 3. Default to PA
pub fn classify(name: &str, metadata: &Metadata) -> ViewCode {
    view_from_metadata(metadata)
        .or_else(|| view_from_filename(name))
        .unwrap_or(ViewCode::Pa)
}

/// Parses a projection from free text such as a metadata value
pub fn view_from_text(s: &str) -> Option<ViewCode> {
    match_keyword(s.trim(), VIEW_KEYWORDS)
}

/// Infers a projection from a file name, word-boundary safe
///
/// ```
/// use fractriage_core::extraction::view_from_filename;
/// use fractriage_core::ViewCode;
///
/// assert_eq!(view_from_filename("hand-pa.jpg"), Some(ViewCode::Pa));
/// assert_eq!(view_from_filename("plate-123.jpeg"), None);
/// ```
pub fn view_from_filename(name: &str) -> Option<ViewCode> {
    match_keyword(name, VIEW_KEYWORDS)
}

fn view_from_metadata(metadata: &Metadata) -> Option<ViewCode> {
    VIEW_HINT_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(|v| v.as_str()))
        .find_map(view_from_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn meta(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().unwrap_or_default()
    }

    #[rstest]
    #[case("hand-pa.jpg", Some(ViewCode::Pa))]
    #[case("lat-elbow.png", Some(ViewCode::Lateral))]
    #[case("scapula.jpg", None)]
    #[case("plate-123.jpeg", None)]
    #[case("wrist_LATERAL_2.png", Some(ViewCode::Lateral))]
    #[case("wrist oblique.jpg", Some(ViewCode::Oblique))]
    #[case("wrist-obl.jpg", Some(ViewCode::Oblique))]
    #[case("AP_wrist.jpg", Some(ViewCode::Pa))]
    #[case("capture.jpg", None)]
    fn test_view_from_filename(#[case] name: &str, #[case] expected: Option<ViewCode>) {
        assert_eq!(view_from_filename(name), expected);
    }

    #[test]
    fn test_lateral_oblique_is_oblique() {
        assert_eq!(view_from_text("lateral oblique"), Some(ViewCode::Oblique));
    }

    #[test]
    fn test_classify_default_is_pa() {
        assert_eq!(classify("IMG_0001.jpg", &Metadata::new()), ViewCode::Pa);
    }

    #[test]
    fn test_classify_metadata_wins_over_filename() {
        let m = meta(json!({"view": "Lateral"}));
        assert_eq!(classify("hand-pa.jpg", &m), ViewCode::Lateral);
    }

    #[test]
    fn test_classify_unmapped_metadata_falls_back_to_filename() {
        let m = meta(json!({"view": "weird", "projection": 7}));
        assert_eq!(classify("lat-wrist.png", &m), ViewCode::Lateral);
    }

    #[test]
    fn test_classify_secondary_hint_key() {
        let m = meta(json!({"viewPosition": "LAT"}));
        assert_eq!(classify("scan.png", &m), ViewCode::Lateral);
    }
}
