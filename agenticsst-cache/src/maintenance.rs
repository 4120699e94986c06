//! Cache Maintenance Background Task
//!
//! Periodic housekeeping for the cache store:
//!
//! 1. Sweeps expired entries (correctness never depends on this - `get`
//!    already treats expired entries as absent - the sweep only reclaims
//!    memory).
//! 2. Computes the preload advisory: the most-accessed documents, logged so
//!    operators can see what a warm-up pass should target.
//! 3. Emits a statistics report as a structured log event.
//!
//! There is no implicit timer: the application constructs a
//! [`MaintenanceScheduler`], calls `start()` during startup, and `stop()`
//! during shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agenticsst_core::{ConfigError, SstResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::store::CacheStore;

/// Default maintenance interval: one hour.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 3600;

/// Default number of entries in the preload advisory.
pub const DEFAULT_ADVISORY_TOP_N: usize = 10;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the maintenance task.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// How often the maintenance tick runs (default: 1 hour).
    pub tick_interval: Duration,

    /// How many entries the preload advisory ranks (default: 10).
    pub advisory_top_n: usize,

    /// Whether to emit the statistics report each tick (default: true).
    pub log_report: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            advisory_top_n: DEFAULT_ADVISORY_TOP_N,
            log_report: true,
        }
    }
}

impl MaintenanceConfig {
    /// Create MaintenanceConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `AGENTICSST_MAINTENANCE_INTERVAL_SECS`: tick interval (default: 3600)
    /// - `AGENTICSST_MAINTENANCE_TOP_N`: advisory size (default: 10)
    /// - `AGENTICSST_MAINTENANCE_LOG_REPORT`: emit the stats report (default: true)
    pub fn from_env() -> Self {
        let tick_interval = Duration::from_secs(
            std::env::var("AGENTICSST_MAINTENANCE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TICK_INTERVAL_SECS),
        );

        let advisory_top_n = std::env::var("AGENTICSST_MAINTENANCE_TOP_N")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ADVISORY_TOP_N);

        let log_report = std::env::var("AGENTICSST_MAINTENANCE_LOG_REPORT")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            tick_interval,
            advisory_top_n,
            log_report,
        }
    }

    /// Create a configuration for development/testing with a short interval.
    pub fn development() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            advisory_top_n: 5,
            log_report: true,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SstResult<()> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval".to_string(),
                value: "0".to_string(),
                reason: "interval must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Metrics for maintenance activity.
#[derive(Debug, Default)]
pub struct MaintenanceMetrics {
    /// Total maintenance ticks completed.
    pub ticks: AtomicU64,

    /// Total expired entries removed since startup.
    pub entries_swept: AtomicU64,
}

impl MaintenanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> MaintenanceSnapshot {
        MaintenanceSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            entries_swept: self.entries_swept.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of maintenance metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MaintenanceSnapshot {
    pub ticks: u64,
    pub entries_swept: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task driving periodic cache maintenance.
///
/// Runs until the shutdown signal is received (or the sender is dropped).
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = tokio::spawn(maintenance_task(store, config, shutdown_rx));
///
/// // Later, trigger shutdown
/// let _ = shutdown_tx.send(true);
/// let metrics = handle.await.unwrap();
/// ```
pub async fn maintenance_task(
    store: Arc<CacheStore>,
    config: MaintenanceConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<MaintenanceMetrics> {
    let metrics = Arc::new(MaintenanceMetrics::new());

    let mut tick = interval(config.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        tick_interval_secs = config.tick_interval.as_secs(),
        advisory_top_n = config.advisory_top_n,
        "Cache maintenance task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Cache maintenance task shutting down");
                    break;
                }
            }

            _ = tick.tick() => {
                run_tick(&store, &config, &metrics);
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        ticks = snapshot.ticks,
        entries_swept = snapshot.entries_swept,
        "Cache maintenance task completed"
    );

    metrics
}

/// Perform one maintenance cycle.
fn run_tick(store: &CacheStore, config: &MaintenanceConfig, metrics: &MaintenanceMetrics) {
    metrics.ticks.fetch_add(1, Ordering::Relaxed);

    let swept = store.sweep_expired();
    metrics.entries_swept.fetch_add(swept as u64, Ordering::Relaxed);

    let advisory = store.top_accessed(config.advisory_top_n);
    for (key, access_count) in &advisory {
        tracing::trace!(key = %key, access_count = *access_count, "Preload advisory candidate");
    }
    tracing::debug!(
        swept,
        advisory_candidates = advisory.len(),
        "Cache maintenance cycle completed"
    );

    if config.log_report {
        let stats = store.stats();
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            evictions = stats.evictions,
            hit_rate_percent = stats.hit_rate_percent,
            total_size_bytes = stats.total_size_bytes,
            documents = stats.document_entries,
            analyses = stats.analysis_entries,
            scripts = stats.script_entries,
            compute_time_saved_ms = stats.compute_time_saved_ms,
            "Cache performance report"
        );
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Explicit lifecycle owner for the maintenance task.
///
/// Owned by application startup; `start()` spawns the background task on the
/// current tokio runtime and `stop()` shuts it down and returns the collected
/// metrics.
pub struct MaintenanceScheduler {
    store: Arc<CacheStore>,
    config: MaintenanceConfig,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<Arc<MaintenanceMetrics>>>,
}

impl MaintenanceScheduler {
    pub fn new(store: Arc<CacheStore>, config: MaintenanceConfig) -> Self {
        Self {
            store,
            config,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Whether the background task is currently running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the maintenance task. A no-op if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        self.handle = Some(tokio::spawn(maintenance_task(store, config, shutdown_rx)));
        self.shutdown_tx = Some(shutdown_tx);
    }

    /// Signal shutdown and wait for the task to finish.
    ///
    /// Returns the metrics collected over the task's lifetime, or `None` if
    /// the task was not running.
    pub async fn stop(&mut self) -> Option<Arc<MaintenanceMetrics>> {
        let shutdown_tx = self.shutdown_tx.take()?;
        let handle = self.handle.take()?;
        let _ = shutdown_tx.send(true);
        match handle.await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::error!(error = %e, "Maintenance task failed to join");
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
