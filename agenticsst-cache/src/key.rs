//! Cache key derivation.
//!
//! Each namespace addresses entries by string key:
//!
//! - documents: `doc_<document_id>`
//! - analyses: the bare filter key
//! - scripts: `script_<scenario_id>_<filter_key>`
//!
//! The filter key is a fixed-length digest of the canonical filter JSON, so
//! logically equal filter sets always address the same entry. The script key
//! embeds the filter key verbatim, which is what filter-cascade invalidation
//! matches on.

use agenticsst_core::{AnalysisFilters, DocumentId, ScenarioId, SstResult};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a derived filter key, in hex characters.
pub const FILTER_KEY_LEN: usize = 32;

/// Key prefix for the document namespace.
const DOCUMENT_KEY_PREFIX: &str = "doc_";

/// Key prefix for the script namespace.
const SCRIPT_KEY_PREFIX: &str = "script_";

/// A fixed-length key derived from filter parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey(String);

impl FilterKey {
    /// Derive the key for a filter set.
    ///
    /// Canonical JSON (name-sorted) is hashed with SHA-256 and the digest is
    /// truncated to [`FILTER_KEY_LEN`] hex characters. Fails only when the
    /// filters cannot be serialized.
    pub fn derive(filters: &AnalysisFilters) -> SstResult<Self> {
        let canonical = filters.canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Ok(Self(digest[..FILTER_KEY_LEN].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for a document entry.
pub fn document_key(id: &DocumentId) -> String {
    format!("{}{}", DOCUMENT_KEY_PREFIX, id)
}

/// Key for a generated-script entry.
pub fn script_key(scenario: ScenarioId, filter_key: &FilterKey) -> String {
    format!("{}{}_{}", SCRIPT_KEY_PREFIX, scenario, filter_key)
}
