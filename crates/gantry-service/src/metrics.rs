//! Metrics emitted by the service layer.

use metrics::{counter, describe_counter};

/// Metric names for the service layer.
pub mod names {
    /// Provider cache lookups, labelled by entry kind and outcome.
    pub const CACHE_LOOKUPS_TOTAL: &str = "gantry_cache_lookups_total";
    /// Cache errors absorbed by the service.
    pub const CACHE_ERRORS_TOTAL: &str = "gantry_cache_errors_total";
    /// Detached background tasks spawned.
    pub const BACKGROUND_TASKS_SPAWNED_TOTAL: &str = "gantry_background_tasks_spawned_total";
    /// Detached background tasks that failed.
    pub const BACKGROUND_TASKS_FAILED_TOTAL: &str = "gantry_background_tasks_failed_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_LOOKUPS_TOTAL,
        "Total number of provider cache lookups"
    );
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total number of cache errors absorbed by the service"
    );
    describe_counter!(
        names::BACKGROUND_TASKS_SPAWNED_TOTAL,
        "Total number of detached cache tasks spawned"
    );
    describe_counter!(
        names::BACKGROUND_TASKS_FAILED_TOTAL,
        "Total number of detached cache tasks that failed"
    );
}

pub(crate) fn cache_lookup(entry: &'static str, hit: bool) {
    counter!(
        names::CACHE_LOOKUPS_TOTAL,
        "entry" => entry,
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

pub(crate) fn cache_error(operation: &'static str) {
    counter!(names::CACHE_ERRORS_TOTAL, "operation" => operation).increment(1);
}

pub(crate) fn task_spawned(name: &'static str) {
    counter!(names::BACKGROUND_TASKS_SPAWNED_TOTAL, "task" => name).increment(1);
}

pub(crate) fn task_failed(name: &'static str) {
    counter!(names::BACKGROUND_TASKS_FAILED_TOTAL, "task" => name).increment(1);
}
