//! Multi-namespace cache store.
//!
//! Three namespaces (crawled documents, computed analyses, generated
//! scripts) share one byte budget and one statistics block. All state lives
//! behind a single coarse `RwLock`: every operation mutates either access
//! metadata or the shared counters, and the expensive work (crawling,
//! analysis, orchestration) always happens outside the lock.

use std::collections::BTreeSet;
use std::sync::RwLock;
use std::time::Duration;

use agenticsst_core::{
    AnalysisFilters, AnalysisReport, ConfigError, CrawledDocument, DocumentId, ScenarioId,
    ScenarioScript, SstResult,
};
use chrono::Utc;
use serde::Serialize;

use crate::entry::{CacheEntry, EntryMetadata};
use crate::key::{document_key, script_key, FilterKey};
use crate::namespace::{Namespace, NamespaceKind};
use crate::stats::{CacheStats, CacheStatsSnapshot};

/// Default total byte budget: 100 MiB.
pub const DEFAULT_CAPACITY_BYTES: u64 = 100 * 1024 * 1024;

/// Default entry time-to-live: 24 hours.
pub const DEFAULT_ENTRY_TTL_SECS: u64 = 24 * 60 * 60;

/// Size estimate used when the caller supplies none and the payload cannot
/// be serialized.
pub const DEFAULT_FALLBACK_ENTRY_SIZE_BYTES: usize = 1000;

/// Configuration for the cache store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total byte budget across all namespaces.
    pub capacity_bytes: u64,
    /// Age past which an entry is treated as absent.
    pub entry_ttl: Duration,
    /// Size estimate of last resort for unserializable payloads.
    pub fallback_entry_size_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            entry_ttl: Duration::from_secs(DEFAULT_ENTRY_TTL_SECS),
            fallback_entry_size_bytes: DEFAULT_FALLBACK_ENTRY_SIZE_BYTES,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total byte budget.
    pub fn with_capacity_bytes(mut self, capacity_bytes: u64) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Set the entry TTL.
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the fallback size estimate.
    pub fn with_fallback_entry_size(mut self, size_bytes: usize) -> Self {
        self.fallback_entry_size_bytes = size_bytes;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SstResult<()> {
        if self.capacity_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capacity_bytes".to_string(),
                value: "0".to_string(),
                reason: "capacity must be positive".to_string(),
            }
            .into());
        }
        if self.entry_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "entry_ttl".to_string(),
                value: "0".to_string(),
                reason: "TTL must be positive".to_string(),
            }
            .into());
        }
        if self.fallback_entry_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fallback_entry_size_bytes".to_string(),
                value: "0".to_string(),
                reason: "fallback size must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct StoreInner {
    documents: Namespace<CrawledDocument>,
    analyses: Namespace<AnalysisReport>,
    scripts: Namespace<ScenarioScript>,
    stats: CacheStats,
    /// Monotonic insertion counter; LRU tie-break.
    sequence: u64,
}

impl StoreInner {
    fn total_size_bytes(&self) -> u64 {
        self.documents.total_size_bytes()
            + self.analyses.total_size_bytes()
            + self.scripts.total_size_bytes()
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Multi-namespace in-process cache.
///
/// Construct one per application and share it via `Arc`; the maintenance
/// scheduler holds a clone for the periodic expiry sweep.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(CacheStore::with_defaults());
///
/// store.put_document(document, EntryMetadata::new());
/// if let Some(doc) = store.get_document(&id) {
///     // served from cache, no re-crawl
/// }
/// ```
#[derive(Debug)]
pub struct CacheStore {
    config: CacheConfig,
    inner: RwLock<StoreInner>,
}

impl CacheStore {
    /// Create a new store with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Create a new store with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Get the store configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Store or overwrite a crawled document.
    ///
    /// Records one miss: by convention a put follows a failed lookup, so the
    /// pair counts as a single unsatisfied request.
    pub fn put_document(&self, document: CrawledDocument, meta: EntryMetadata) {
        let key = document_key(&document.document_id);
        let size_bytes = self.estimate_size(&document, &meta);
        let mut inner = self.inner.write().unwrap();
        Self::ensure_capacity(&mut inner, self.config.capacity_bytes, size_bytes);
        let sequence = inner.next_sequence();
        let entry = CacheEntry::new(
            document,
            size_bytes,
            sequence,
            meta.compute_time_ms,
            meta.document_ids,
        );
        inner.documents.insert(key.clone(), entry);
        inner.stats.record_miss();
        tracing::debug!(key = %key, size_bytes, "Document cached");
    }

    /// Fetch a document by id. Expired entries are treated as absent but are
    /// left in place for the sweep to reclaim.
    pub fn get_document(&self, id: &DocumentId) -> Option<CrawledDocument> {
        let key = document_key(id);
        let now = Utc::now();
        let ttl = self.config.entry_ttl;
        let mut inner = self.inner.write().unwrap();
        let StoreInner {
            documents, stats, ..
        } = &mut *inner;
        match documents.get_mut(&key) {
            Some(entry) if !entry.is_expired(now, ttl) => {
                entry.touch(now);
                stats.record_hit();
                Some(entry.payload().clone())
            }
            _ => {
                stats.record_miss();
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Analyses
    // ------------------------------------------------------------------

    /// Store an analysis result under its derived filter key.
    ///
    /// The entry is tagged with the union of the caller-supplied document ids
    /// and the report's own document references, so a document invalidation
    /// can reach it later. Fails only if the filters cannot be serialized.
    pub fn put_analysis(
        &self,
        filters: &AnalysisFilters,
        report: AnalysisReport,
        meta: EntryMetadata,
    ) -> SstResult<()> {
        let key = FilterKey::derive(filters)?;
        let size_bytes = self.estimate_size(&report, &meta);
        let compute_time_ms = meta.compute_time_ms.or(report.compute_time_ms);
        let mut tags: BTreeSet<DocumentId> = meta.document_ids;
        tags.extend(report.document_references.iter().cloned());

        let mut inner = self.inner.write().unwrap();
        Self::ensure_capacity(&mut inner, self.config.capacity_bytes, size_bytes);
        let sequence = inner.next_sequence();
        let entry = CacheEntry::new(report, size_bytes, sequence, compute_time_ms, tags);
        inner.analyses.insert(key.as_str().to_string(), entry);
        inner.stats.record_miss();
        tracing::debug!(key = %key, size_bytes, "Analysis cached");
        Ok(())
    }

    /// Fetch an analysis result for the given filters.
    ///
    /// A hit credits the entry's compute time to the time-saved counter: the
    /// caller just avoided that much recomputation.
    pub fn get_analysis(&self, filters: &AnalysisFilters) -> SstResult<Option<AnalysisReport>> {
        let key = FilterKey::derive(filters)?;
        let now = Utc::now();
        let ttl = self.config.entry_ttl;
        let mut inner = self.inner.write().unwrap();
        let StoreInner {
            analyses, stats, ..
        } = &mut *inner;
        match analyses.get_mut(key.as_str()) {
            Some(entry) if !entry.is_expired(now, ttl) => {
                entry.touch(now);
                stats.record_hit();
                if let Some(saved) = entry.compute_time_ms() {
                    stats.compute_time_saved_ms += saved;
                    tracing::debug!(key = %key, saved_ms = saved, "Analysis cache hit");
                }
                Ok(Some(entry.payload().clone()))
            }
            _ => {
                stats.record_miss();
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------

    /// Store a generated script under its composite scenario + filter key.
    pub fn put_script(
        &self,
        scenario: ScenarioId,
        filters: &AnalysisFilters,
        script: ScenarioScript,
        meta: EntryMetadata,
    ) -> SstResult<()> {
        let filter_key = FilterKey::derive(filters)?;
        let key = script_key(scenario, &filter_key);
        let size_bytes = self.estimate_size(&script, &meta);
        let mut tags: BTreeSet<DocumentId> = meta.document_ids;
        tags.extend(script.source_documents.iter().cloned());

        let mut inner = self.inner.write().unwrap();
        Self::ensure_capacity(&mut inner, self.config.capacity_bytes, size_bytes);
        let sequence = inner.next_sequence();
        let entry = CacheEntry::new(script, size_bytes, sequence, meta.compute_time_ms, tags);
        inner.scripts.insert(key.clone(), entry);
        inner.stats.record_miss();
        tracing::debug!(key = %key, scenario = %scenario, size_bytes, "Script cached");
        Ok(())
    }

    /// Fetch a generated script for the given scenario and filters.
    pub fn get_script(
        &self,
        scenario: ScenarioId,
        filters: &AnalysisFilters,
    ) -> SstResult<Option<ScenarioScript>> {
        let filter_key = FilterKey::derive(filters)?;
        let key = script_key(scenario, &filter_key);
        let now = Utc::now();
        let ttl = self.config.entry_ttl;
        let mut inner = self.inner.write().unwrap();
        let StoreInner { scripts, stats, .. } = &mut *inner;
        match scripts.get_mut(&key) {
            Some(entry) if !entry.is_expired(now, ttl) => {
                entry.touch(now);
                stats.record_hit();
                if let Some(saved) = entry.compute_time_ms() {
                    stats.compute_time_saved_ms += saved;
                }
                Ok(Some(entry.payload().clone()))
            }
            _ => {
                stats.record_miss();
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Invalidate everything derived from a document.
    ///
    /// Removes the document entry itself, then every analysis and script
    /// entry tagged with the document id. Cascaded removals count as
    /// evictions; the directly-addressed removal does not. Unknown ids are a
    /// silent no-op.
    pub fn invalidate_document(&self, id: &DocumentId) {
        let key = document_key(id);
        let mut inner = self.inner.write().unwrap();
        let StoreInner {
            documents,
            analyses,
            scripts,
            stats,
            ..
        } = &mut *inner;
        documents.remove(&key);
        let cascaded = analyses.retain_entries(|_, entry| !entry.references_document(id))
            + scripts.retain_entries(|_, entry| !entry.references_document(id));
        stats.evictions += cascaded as u64;
        tracing::debug!(document_id = %id, cascaded, "Document invalidated");
    }

    /// Invalidate the analysis for a filter set, plus every script generated
    /// from the same filters (their keys embed the filter key).
    pub fn invalidate_filters(&self, filters: &AnalysisFilters) -> SstResult<()> {
        let filter_key = FilterKey::derive(filters)?;
        let mut inner = self.inner.write().unwrap();
        let StoreInner {
            analyses,
            scripts,
            stats,
            ..
        } = &mut *inner;
        analyses.remove(filter_key.as_str());
        let cascaded = scripts.retain_entries(|key, _| !key.contains(filter_key.as_str()));
        stats.evictions += cascaded as u64;
        tracing::debug!(filter_key = %filter_key, cascaded, "Filter results invalidated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Maintenance support
    // ------------------------------------------------------------------

    /// Remove expired entries from every namespace. Returns the number
    /// removed; each removal counts as an eviction.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = self.config.entry_ttl;
        let mut inner = self.inner.write().unwrap();
        let StoreInner {
            documents,
            analyses,
            scripts,
            stats,
            ..
        } = &mut *inner;
        let swept = documents.sweep_expired(now, ttl)
            + analyses.sweep_expired(now, ttl)
            + scripts.sweep_expired(now, ttl);
        stats.evictions += swept as u64;
        if swept > 0 {
            tracing::debug!(swept, "Expired cache entries removed");
        }
        swept
    }

    /// Rank document entries by access count, descending. Advisory only: the
    /// maintenance tick logs the result so operators can see what a preload
    /// pass should target.
    pub fn top_accessed(&self, n: usize) -> Vec<(String, u64)> {
        let inner = self.inner.read().unwrap();
        let mut ranked: Vec<(String, u64)> = inner
            .documents
            .iter()
            .map(|(key, entry)| (key.clone(), entry.access_count()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Read-only statistics snapshot.
    pub fn stats(&self) -> CacheStatsSnapshot {
        let inner = self.inner.read().unwrap();
        CacheStatsSnapshot {
            hits: inner.stats.hits,
            misses: inner.stats.misses,
            evictions: inner.stats.evictions,
            compute_time_saved_ms: inner.stats.compute_time_saved_ms,
            total_size_bytes: inner.total_size_bytes(),
            document_entries: inner.documents.len(),
            analysis_entries: inner.analyses.len(),
            script_entries: inner.scripts.len(),
            hit_rate_percent: inner.stats.hit_rate_percent(),
        }
    }

    /// Empty all namespaces and reset all counters.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.documents.clear();
        inner.analyses.clear();
        inner.scripts.clear();
        inner.stats = CacheStats::default();
        inner.sequence = 0;
        tracing::debug!("Cache cleared");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resolve the size estimate for a write: caller-supplied, else
    /// serialized length, else the configured fallback constant.
    fn estimate_size<T: Serialize>(&self, payload: &T, meta: &EntryMetadata) -> usize {
        meta.size_bytes.unwrap_or_else(|| {
            serde_json::to_vec(payload)
                .map(|bytes| bytes.len())
                .unwrap_or(self.config.fallback_entry_size_bytes)
        })
    }

    /// Make room for an incoming entry by evicting least-recently-used
    /// entries across all namespaces.
    ///
    /// Eviction stops once the incoming entry's size has been freed. When
    /// even a full eviction cannot make room (the entry is larger than the
    /// whole budget), the write still proceeds and the store runs over
    /// capacity until entries expire or are invalidated.
    fn ensure_capacity(inner: &mut StoreInner, capacity_bytes: u64, incoming: usize) {
        let current = inner.total_size_bytes();
        if current + incoming as u64 <= capacity_bytes {
            return;
        }

        let mut candidates = Vec::new();
        inner
            .documents
            .collect_candidates(NamespaceKind::Documents, &mut candidates);
        inner
            .analyses
            .collect_candidates(NamespaceKind::Analyses, &mut candidates);
        inner
            .scripts
            .collect_candidates(NamespaceKind::Scripts, &mut candidates);
        candidates.sort_by(|a, b| {
            (a.last_accessed_at, a.sequence).cmp(&(b.last_accessed_at, b.sequence))
        });

        let mut freed: u64 = 0;
        let mut evicted: u64 = 0;
        for candidate in candidates {
            if freed >= incoming as u64 {
                break;
            }
            let removed = match candidate.namespace {
                NamespaceKind::Documents => inner.documents.remove(&candidate.key).is_some(),
                NamespaceKind::Analyses => inner.analyses.remove(&candidate.key).is_some(),
                NamespaceKind::Scripts => inner.scripts.remove(&candidate.key).is_some(),
            };
            if removed {
                freed += candidate.size_bytes as u64;
                evicted += 1;
            }
        }
        inner.stats.evictions += evicted;
        tracing::debug!(evicted, freed_bytes = freed, "LRU eviction completed");

        if incoming as u64 > capacity_bytes {
            tracing::warn!(
                incoming_bytes = incoming,
                capacity_bytes,
                "Entry larger than total cache capacity; accepting oversized write"
            );
        }
    }
}
