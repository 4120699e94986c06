//! Cache entry bookkeeping.
//!
//! Every stored item carries access metadata (creation time, last access,
//! access count), a byte-size estimate for capacity accounting, and an
//! explicit set of source-document tags used by cascade invalidation.

use agenticsst_core::{DocumentId, Timestamp};
use chrono::Utc;
use std::collections::BTreeSet;
use std::time::Duration;

/// Caller-supplied metadata attached to a cache write.
#[derive(Debug, Clone, Default)]
pub struct EntryMetadata {
    /// Serialized payload size, when the caller already knows it. When absent
    /// the store estimates it from the serialized payload.
    pub size_bytes: Option<usize>,
    /// Wall-clock cost of producing the payload.
    pub compute_time_ms: Option<u64>,
    /// Source documents the payload was derived from.
    pub document_ids: BTreeSet<DocumentId>,
}

impl EntryMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the known serialized size.
    pub fn with_size_bytes(mut self, size_bytes: usize) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Set the measured compute time.
    pub fn with_compute_time_ms(mut self, compute_time_ms: u64) -> Self {
        self.compute_time_ms = Some(compute_time_ms);
        self
    }

    /// Tag the entry with one source document.
    pub fn with_document(mut self, id: DocumentId) -> Self {
        self.document_ids.insert(id);
        self
    }

    /// Tag the entry with several source documents.
    pub fn with_documents(mut self, ids: impl IntoIterator<Item = DocumentId>) -> Self {
        self.document_ids.extend(ids);
        self
    }
}

/// One stored cache item plus its access bookkeeping.
///
/// `last_accessed_at` is always >= `created_at`: both start at the write
/// time and only `touch` moves the access timestamp forward.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    payload: T,
    created_at: Timestamp,
    last_accessed_at: Timestamp,
    access_count: u64,
    size_bytes: usize,
    /// Monotonic insertion counter, the deterministic LRU tie-break.
    sequence: u64,
    compute_time_ms: Option<u64>,
    document_ids: BTreeSet<DocumentId>,
}

impl<T> CacheEntry<T> {
    /// Create a new entry at the current time.
    pub fn new(
        payload: T,
        size_bytes: usize,
        sequence: u64,
        compute_time_ms: Option<u64>,
        document_ids: BTreeSet<DocumentId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            payload,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            size_bytes,
            sequence,
            compute_time_ms,
            document_ids,
        }
    }

    /// Record a successful read at `now`.
    pub fn touch(&mut self, now: Timestamp) {
        self.access_count += 1;
        if now > self.last_accessed_at {
            self.last_accessed_at = now;
        }
    }

    /// Age of the entry at `now`.
    pub fn age(&self, now: Timestamp) -> Duration {
        now.signed_duration_since(self.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is past its time-to-live at `now`.
    ///
    /// Expiry is strict: an entry aged exactly `ttl` is still alive.
    pub fn is_expired(&self, now: Timestamp, ttl: Duration) -> bool {
        self.age(now) > ttl
    }

    /// Whether this entry was derived from the given document.
    pub fn references_document(&self, id: &DocumentId) -> bool {
        self.document_ids.contains(id)
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Timestamp {
        self.last_accessed_at
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn compute_time_ms(&self) -> Option<u64> {
        self.compute_time_ms
    }

    pub fn document_ids(&self) -> &BTreeSet<DocumentId> {
        &self.document_ids
    }
}
