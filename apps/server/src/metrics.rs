//! Metrics collection for the inventory service
//!
//! This module defines the Prometheus metrics exposed at `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Histogram,
    HistogramVec, IntCounterVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cce_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "cce_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    // Permission Metrics

    /// Outbound permission-string fetches by outcome (fresh, not_modified, error)
    pub static ref PERMISSION_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cce_permission_fetches_total",
        "Total number of permission-string fetches by outcome",
        &["outcome"]
    )
    .expect("Failed to register PERMISSION_FETCHES_TOTAL");

    // Search Metrics

    /// Inventory searches by status (success or error code)
    pub static ref INVENTORY_SEARCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cce_inventory_searches_total",
        "Total number of inventory searches",
        &["status"]
    )
    .expect("Failed to register INVENTORY_SEARCHES_TOTAL");

    /// Inventory search duration, including permission refresh
    pub static ref INVENTORY_SEARCH_DURATION_SECONDS: Histogram = register_histogram!(
        "cce_inventory_search_duration_seconds",
        "Inventory search duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register INVENTORY_SEARCH_DURATION_SECONDS");
}

/// Collapse path segments that look like ids to keep label cardinality bounded.
pub fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok()
                || (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
            {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
