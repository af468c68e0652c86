use regex::Regex;
use std::sync::OnceLock;

/// Keys of this length or shorter only match whole tokens
pub const SHORT_KEY_MAX_LEN: usize = 3;

/// Splits text into lowercase alphanumeric tokens
///
/// `"Hand_PA-2.jpg"` → `["hand", "pa", "2", "jpg"]`
pub fn tokens(s: &str) -> Vec<String> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("Failed to compile regex"));

    let lower = s.to_lowercase();
    re.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Looks up the first table entry matching `text`
///
/// Short keys (≤ [`SHORT_KEY_MAX_LEN`]) must equal a whole token so that
/// e.g. "lat" does not fire inside "plate". Longer keys match anywhere.
/// Table order decides between multiple hits.
pub fn match_keyword<T: Copy>(text: &str, table: &[(&str, T)]) -> Option<T> {
    let lower = text.to_lowercase();
    let toks = tokens(&lower);

    table
        .iter()
        .find(|(key, _)| {
            if key.len() <= SHORT_KEY_MAX_LEN {
                toks.iter().any(|t| t == key)
            } else {
                lower.contains(key)
            }
        })
        .map(|(_, value)| *value)
}
