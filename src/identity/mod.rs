//! Finding identity and the set of already-posted findings.
//!
//! Two findings with the same normalized path, line, message, severity and
//! source always get the same key. The column is left out: tools are not
//! column-stable across runs, and two reports that only differ there are
//! the same issue.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::models::finding::{Finding, IdentityKey};

/// Compute the identity key of `finding` matched under `normalized_path`.
///
/// Each field is length-prefixed before hashing, so no choice of field
/// contents can make two different tuples encode to the same bytes.
pub fn identify(normalized_path: &str, finding: &Finding) -> IdentityKey {
    let line = finding.line.to_string();
    let fields: [(&str, &[u8]); 5] = [
        ("path", normalized_path.as_bytes()),
        ("line", line.as_bytes()),
        ("message", finding.message.as_bytes()),
        ("severity", finding.severity.as_bytes()),
        ("source", finding.source.as_deref().unwrap_or("").as_bytes()),
    ];

    let mut hasher = Sha256::new();
    for (name, value) in fields {
        hasher.update(name.as_bytes());
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(value);
    }
    IdentityKey::from_hex(hex::encode(hasher.finalize()))
}

/// Identity keys already reported during this run.
#[derive(Debug, Clone, Default)]
pub struct PostedSet {
    keys: HashSet<IdentityKey>,
}

impl PostedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_posted(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    /// Record `key` as posted. Returns `false` if it was already present.
    pub fn mark_posted(&mut self, key: IdentityKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<IdentityKey> for PostedSet {
    fn from_iter<I: IntoIterator<Item = IdentityKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Extend<IdentityKey> for PostedSet {
    fn extend<I: IntoIterator<Item = IdentityKey>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}
