//! Report cache keyed by filter parameters.
//!
//! Reports depend only on the immutable data set and the filter, so a
//! cached report stays valid for the whole session.

use crate::filter::FilterParams;
use crate::pipeline::DashboardReport;
use ecomdash_config::CacheConfig;
use moka::sync::Cache;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Cache performance metrics
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert(
            "invalidations".to_string(),
            self.invalidations.load(Ordering::Relaxed),
        );
        stats
    }
}

/// Bounded cache of computed dashboard reports.
pub struct ReportCache {
    cache: Cache<FilterParams, Arc<DashboardReport>>,
    metrics: Arc<CacheMetrics>,
}

impl ReportCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Build from configuration; `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config.max_capacity))
    }

    #[instrument(skip(self), fields(range = %params.range))]
    pub fn get(&self, params: &FilterParams) -> Option<Arc<DashboardReport>> {
        let cached = self.cache.get(params);
        if cached.is_some() {
            debug!("Report cache hit");
            self.metrics.record_hit();
        } else {
            debug!("Report cache miss");
            self.metrics.record_miss();
        }
        cached
    }

    pub fn put(&self, params: FilterParams, report: Arc<DashboardReport>) {
        self.cache.insert(params, report);
    }

    /// Cached report for `params`, computing and storing it on a miss.
    pub fn get_or_compute<F>(&self, params: &FilterParams, compute: F) -> Arc<DashboardReport>
    where
        F: FnOnce() -> DashboardReport,
    {
        if let Some(report) = self.get(params) {
            return report;
        }
        let report = Arc::new(compute());
        self.put(*params, Arc::clone(&report));
        report
    }

    #[instrument(skip(self))]
    pub fn invalidate_all(&self) {
        let entry_count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.metrics
            .invalidations
            .fetch_add(entry_count, Ordering::Relaxed);
        info!("Invalidated {} cached reports", entry_count);
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn stats(&self) -> HashMap<String, u64> {
        let mut stats = self.metrics.get_stats();
        stats.insert("entry_count".to_string(), self.cache.entry_count());
        stats
    }
}

impl std::fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
