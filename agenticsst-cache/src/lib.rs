//! Multi-namespace in-process cache for AgenticSST.
//!
//! Crawling the CNESST corpus, computing compliance analyses, and running the
//! multi-agent script orchestration are all expensive; this crate caches
//! their results so repeated requests skip the recomputation.
//!
//! # Design
//!
//! Three namespaces - crawled documents, computed analyses, generated
//! scripts - share one byte budget and one statistics block. Writes evict
//! least-recently-used entries when the budget would be exceeded; reads treat
//! entries past their time-to-live as absent. A periodic maintenance task
//! reclaims expired entries and reports cache performance.
//!
//! Invalidation is tag-driven: analysis and script entries record the
//! document ids they were derived from, so re-crawling one document removes
//! exactly the results that depended on it.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(CacheStore::with_defaults());
//! let cache = ReadThrough::new(Arc::clone(&store));
//!
//! // Expensive analysis runs once; the second call is served from cache.
//! let report = cache.analysis(&filters, &analyzer).await?;
//!
//! // Application startup owns the maintenance lifecycle.
//! let mut scheduler = MaintenanceScheduler::new(store, MaintenanceConfig::default());
//! scheduler.start();
//! // ... on shutdown:
//! scheduler.stop().await;
//! ```

pub mod entry;
pub mod key;
pub mod maintenance;
pub mod namespace;
pub mod read_through;
pub mod stats;
pub mod store;

pub use entry::{CacheEntry, EntryMetadata};
pub use key::{document_key, script_key, FilterKey, FILTER_KEY_LEN};
pub use maintenance::{
    maintenance_task, MaintenanceConfig, MaintenanceMetrics, MaintenanceScheduler,
    MaintenanceSnapshot,
};
pub use namespace::{EvictionCandidate, Namespace, NamespaceKind};
pub use read_through::{AnalysisSource, DocumentSource, ReadThrough, ScriptSource};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{CacheConfig, CacheStore};
