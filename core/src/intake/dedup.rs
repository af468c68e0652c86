use crate::extraction::classify;
use crate::types::{ClassifiedImage, ImageAsset, ViewCode, ViewsSummary};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Outcome of deduplicating and classifying an upload batch
#[derive(Debug, Clone, PartialEq)]
pub struct DedupResult {
    /// Surviving images in upload order
    pub images: Vec<ClassifiedImage>,

    /// Distinct views among survivors, first-seen order
    pub views_detected: Vec<ViewCode>,

    pub duplicates_pruned: usize,
    pub missing_lateral: bool,
}

impl DedupResult {
    pub fn summary(&self) -> ViewsSummary {
        ViewsSummary {
            views_detected: self.views_detected.clone(),
            missing_lateral: self.missing_lateral,
            duplicates_pruned: self.duplicates_pruned,
        }
    }

    /// Number of distinct projections that survived
    pub fn view_count(&self) -> usize {
        self.views_detected.len()
    }
}

/// Hex-encoded SHA-256 of the raw bytes
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Drops byte-identical duplicates and classifies the rest
///
/// The first occurrence of each content hash wins. Pure and
/// deterministic: running it again on its own output changes nothing.
pub fn dedup(images: &[ImageAsset]) -> DedupResult {
    let mut seen = HashSet::new();
    let mut survivors = Vec::with_capacity(images.len());
    let mut views_detected = Vec::new();

    for asset in images {
        let hash = content_hash(&asset.bytes);
        if !seen.insert(hash.clone()) {
            debug!("Pruning duplicate upload {} ({})", asset.name, &hash[..12]);
            continue;
        }

        let view = classify(&asset.name, &asset.metadata);
        if !views_detected.contains(&view) {
            views_detected.push(view);
        }

        survivors.push(ClassifiedImage {
            asset: asset.clone(),
            view,
            content_hash: hash,
        });
    }

    DedupResult {
        duplicates_pruned: images.len() - survivors.len(),
        missing_lateral: !views_detected.contains(&ViewCode::Lateral),
        images: survivors,
        views_detected,
    }
}
