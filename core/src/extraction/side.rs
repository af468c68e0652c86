use crate::types::{Metadata, Side};

use super::keywords::tokens;

/// Metadata keys carrying a side marker, in priority order
pub const SIDE_HINT_KEYS: &[&str] = &["side", "patientSide"];

/// Metadata key carrying the side the requester expects to see
pub const EXPECTED_SIDE_KEY: &str = "expectedSide";

const METADATA_LEFT: &[&str] = &["left", "l", "lt"];
const METADATA_RIGHT: &[&str] = &["right", "r", "rt"];

// Single letters are too ambiguous inside file names
const FILENAME_LEFT: &[&str] = &["left", "lt"];
const FILENAME_RIGHT: &[&str] = &["right", "rt"];

/// Detects the side marker of an image
///
/// # Algorithm
///
/// 1. Try `side` metadata
/// 2. Fall back to `patientSide` metadata
/// 3. Fall back to file name tokens ("left"/"lt", "right"/"rt")
/// 4. Otherwise Unknown
pub fn detect_side(name: &str, metadata: &Metadata) -> Side {
    for key in SIDE_HINT_KEYS {
        if let Some(value) = metadata.get(*key).and_then(|v| v.as_str()) {
            let side = parse_side_string(value);
            if !side.is_unknown() {
                return side;
            }
        }
    }

    match_side_tokens(name, FILENAME_LEFT, FILENAME_RIGHT)
}

/// Parses a side marker from a metadata value
///
/// Accepts "L"/"R", "Lt"/"Rt" and the full words, case-insensitively.
/// A value naming both sides is Unknown.
pub fn parse_side_string(s: &str) -> Side {
    match_side_tokens(s, METADATA_LEFT, METADATA_RIGHT)
}

fn match_side_tokens(s: &str, left: &[&str], right: &[&str]) -> Side {
    let toks = tokens(s);
    let has_left = toks.iter().any(|t| left.contains(&t.as_str()));
    let has_right = toks.iter().any(|t| right.contains(&t.as_str()));

    match (has_left, has_right) {
        (true, false) => Side::Left,
        (false, true) => Side::Right,
        _ => Side::Unknown,
    }
}
