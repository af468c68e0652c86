//! Upload intake: content-addressed deduplication and view classification

mod dedup;

pub use dedup::{content_hash, dedup, DedupResult};
