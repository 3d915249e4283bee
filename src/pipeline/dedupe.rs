//! Duplicate-image suppression within a single pass.
//!
//! Source documents frequently repeat a background or logo image on every
//! page; without this step each occurrence would be re-emitted. The set of
//! seen fingerprints lives exactly as long as one extraction or delivery
//! pass — dedup is per-request, never global.

use crate::model::Element;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

/// A deterministic content hash of an image payload.
pub type Fingerprint = [u8; 32];

/// Fingerprint raw image bytes.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Sha256::digest(bytes).into()
}

/// Tracks fingerprints of images already emitted during one pass.
#[derive(Debug, Default)]
pub struct Deduper {
    seen: HashSet<Fingerprint>,
}

impl Deduper {
    /// Fresh state; construct one per pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `element` should be emitted.
    ///
    /// Text always passes. The first occurrence of an image payload passes
    /// and is recorded; later identical payloads are dropped.
    pub fn admit(&mut self, element: &Element) -> bool {
        match element {
            Element::Text(_) => true,
            Element::Image { bytes, .. } => {
                let fp = fingerprint(bytes);
                if self.seen.insert(fp) {
                    true
                } else {
                    debug!("suppressing duplicate image {}", hex::encode(&fp[..8]));
                    false
                }
            }
        }
    }
}

/// Filter a whole element sequence through a fresh [`Deduper`].
pub fn dedupe(elements: Vec<Element>) -> Vec<Element> {
    let mut deduper = Deduper::new();
    elements.into_iter().filter(|e| deduper.admit(e)).collect()
}
