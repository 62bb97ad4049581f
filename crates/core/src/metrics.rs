//! Prometheus metrics for the search pipeline.
//!
//! This module provides metrics for:
//! - Search requests (cache hits, misses, blank keywords)
//! - Per-collection queries (success, failure, timeout)
//! - Fan-out latency and result set sizes

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

/// Search requests by outcome.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("btagg_searches_total", "Total search requests"),
        &["outcome"], // "hit", "miss", "empty"
    )
    .unwrap()
});

/// Per-collection queries by result.
pub static COLLECTION_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "btagg_collection_queries_total",
            "Total per-collection queries issued during fan-out",
        ),
        &["result"], // "ok", "failed", "timeout"
    )
    .unwrap()
});

/// Duration of a full fan-out.
pub static FANOUT_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "btagg_fanout_duration_seconds",
            "Duration of the fan-out across all collections",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
    )
    .unwrap()
});

/// Size of the full sorted result set per cache miss.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "btagg_search_results",
            "Number of results produced per uncached search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES.clone()),
        Box::new(COLLECTION_QUERIES.clone()),
        Box::new(FANOUT_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}
