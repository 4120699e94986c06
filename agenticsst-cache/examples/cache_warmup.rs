//! Wiring demo: store + read-through façade + maintenance lifecycle.
//!
//! Run with: cargo run -p agenticsst-cache --example cache_warmup

use std::sync::Arc;
use std::time::Duration;

use agenticsst_cache::{
    AnalysisSource, CacheConfig, CacheStore, MaintenanceConfig, MaintenanceScheduler, ReadThrough,
};
use agenticsst_core::{AnalysisFilters, AnalysisReport, SstResult};
use async_trait::async_trait;
use chrono::Utc;

/// Stand-in for the real analysis collaborator.
struct SlowAnalyzer;

#[async_trait]
impl AnalysisSource for SlowAnalyzer {
    async fn compute(&self, filters: &AnalysisFilters) -> SstResult<AnalysisReport> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(AnalysisReport {
            summary: format!("Analyse de conformité ({} filtres)", filters.len()),
            findings: serde_json::json!({"obligations": ["comité SST", "programme de prévention"]}),
            document_references: vec!["cnesst-88".into(), "cnesst-101".into()],
            compute_time_ms: None,
            generated_at: Utc::now(),
        })
    }
}

#[tokio::main]
async fn main() -> SstResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let config = CacheConfig::new().with_capacity_bytes(16 * 1024 * 1024);
    config.validate()?;
    let store = Arc::new(CacheStore::new(config));
    let cache = ReadThrough::new(Arc::clone(&store));

    // Application startup owns the maintenance lifecycle explicitly.
    let mut scheduler = MaintenanceScheduler::new(
        Arc::clone(&store),
        MaintenanceConfig {
            tick_interval: Duration::from_secs(2),
            ..MaintenanceConfig::default()
        },
    );
    scheduler.start();

    let filters = AnalysisFilters::new()
        .with("sector", "construction")
        .with("group_size", 25i64);

    // First call computes, second is served from cache.
    let first = cache.analysis(&filters, &SlowAnalyzer).await?;
    tracing::info!(summary = %first.summary, "First request computed");
    let second = cache.analysis(&filters, &SlowAnalyzer).await?;
    tracing::info!(summary = %second.summary, "Second request served from cache");

    tokio::time::sleep(Duration::from_secs(3)).await;

    let stats = store.stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate_percent = stats.hit_rate_percent,
        "Final stats"
    );

    scheduler.stop().await;
    Ok(())
}
