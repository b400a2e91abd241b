//! Dashboard session: reruns on filter changes, newest selection wins.
//!
//! Every call to [`DashboardSession::update`] takes a generation ticket
//! before computing. A result is published only while its ticket is still
//! the newest one issued, so a slow rerun can never replace the report of a
//! later selection.

use crate::cache::ReportCache;
use crate::dataset::Dataset;
use crate::filter::FilterParams;
use crate::geo::CityCustomers;
use crate::pipeline::{DashboardPipeline, DashboardReport};
use arc_swap::ArcSwapOption;
use ecomdash_common::{DashboardError, Result};
use ecomdash_config::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The published report together with the selection that produced it.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub params: FilterParams,
    pub report: Arc<DashboardReport>,
}

pub struct DashboardSession {
    dataset: Arc<Dataset>,
    pipeline: Arc<DashboardPipeline>,
    cache: Option<Arc<ReportCache>>,
    customer_distribution: Option<Arc<Vec<CityCustomers>>>,
    default_params: FilterParams,
    generation: AtomicU64,
    latest: ArcSwapOption<Snapshot>,
}

impl DashboardSession {
    /// Start a session over a loaded data set.
    ///
    /// The per-city distribution does not depend on the date filter and is
    /// computed once here.
    pub fn new(dataset: Dataset, config: &Config) -> Self {
        let pipeline = DashboardPipeline::new(&config.report);
        let customer_distribution = pipeline.customer_distribution(&dataset).map(Arc::new);
        let default_params = FilterParams::resolve(&config.filter, dataset.date_bounds());
        let cache = ReportCache::from_config(&config.cache).map(Arc::new);

        info!(
            range = %default_params.range,
            cached = cache.is_some(),
            cities = customer_distribution.as_ref().map_or(0, |c| c.len()),
            "Dashboard session started"
        );

        Self {
            dataset: Arc::new(dataset),
            pipeline: Arc::new(pipeline),
            cache,
            customer_distribution,
            default_params,
            generation: AtomicU64::new(0),
            latest: ArcSwapOption::empty(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Initial selection: configured bounds, else the data set's span.
    pub fn default_params(&self) -> FilterParams {
        self.default_params
    }

    pub fn customer_distribution(&self) -> Option<Arc<Vec<CityCustomers>>> {
        self.customer_distribution.clone()
    }

    pub fn cache(&self) -> Option<&ReportCache> {
        self.cache.as_deref()
    }

    /// Most recently published report.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.load_full()
    }

    /// Latest generation ticket issued.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Compute the report for `params` on the calling thread.
    pub fn compute(&self, params: &FilterParams) -> Arc<DashboardReport> {
        compute_report(&self.dataset, &self.pipeline, self.cache.as_deref(), params)
    }

    /// Rerun for a new selection on a blocking worker.
    ///
    /// Returns `None` when a newer selection was issued while this one was
    /// computing; the stale report is then dropped unpublished.
    #[instrument(skip(self), fields(range = %params.range))]
    pub async fn update(&self, params: FilterParams) -> Result<Option<Arc<DashboardReport>>> {
        let ticket = self.begin();

        let dataset = Arc::clone(&self.dataset);
        let pipeline = Arc::clone(&self.pipeline);
        let cache = self.cache.clone();
        let report = tokio::task::spawn_blocking(move || {
            compute_report(&dataset, &pipeline, cache.as_deref(), &params)
        })
        .await
        .map_err(|e| DashboardError::with_source("Report computation task failed", e))?;

        Ok(self.publish(ticket, params, report))
    }

    pub(crate) fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn publish(
        &self,
        ticket: u64,
        params: FilterParams,
        report: Arc<DashboardReport>,
    ) -> Option<Arc<DashboardReport>> {
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding superseded report");
            return None;
        }

        let candidate = Arc::new(Snapshot {
            generation: ticket,
            params,
            report: Arc::clone(&report),
        });
        let mut accepted = true;
        self.latest.rcu(|current| match current {
            Some(existing) if existing.generation > ticket => {
                accepted = false;
                Some(Arc::clone(existing))
            }
            _ => {
                accepted = true;
                Some(Arc::clone(&candidate))
            }
        });

        if accepted {
            debug!(ticket, "Published report");
            Some(report)
        } else {
            debug!(ticket, "Discarding superseded report");
            None
        }
    }
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession")
            .field("orders", &self.dataset.orders().len())
            .field("default_params", &self.default_params)
            .field("generation", &self.generation())
            .finish()
    }
}

fn compute_report(
    dataset: &Dataset,
    pipeline: &DashboardPipeline,
    cache: Option<&ReportCache>,
    params: &FilterParams,
) -> Arc<DashboardReport> {
    match cache {
        Some(cache) => cache.get_or_compute(params, || pipeline.run(dataset, params)),
        None => Arc::new(pipeline.run(dataset, params)),
    }
}
