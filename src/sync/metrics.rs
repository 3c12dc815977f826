//! Prometheus metrics for background sync
//!
//! Counts what the detached jobs do, since their outcome never reaches the
//! caller that triggered them.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

lazy_static! {
    /// Counter: background jobs by label and outcome
    pub static ref SYNC_JOBS: CounterVec = register_counter_vec!(
        "tasksync_sync_jobs_total",
        "Background sync jobs by label and outcome",
        &["job", "outcome"]
    )
    .expect("Failed to create sync_jobs metric");

    /// Histogram: background job duration (seconds)
    pub static ref SYNC_JOB_DURATION: HistogramVec = register_histogram_vec!(
        "tasksync_sync_job_duration_seconds",
        "Duration of background sync jobs",
        &["job"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create sync_job_duration metric");

    /// Gauge: jobs currently running on the sync scope
    pub static ref SYNC_JOBS_IN_FLIGHT: Gauge = register_gauge!(
        "tasksync_sync_jobs_in_flight",
        "Background sync jobs currently running"
    )
    .expect("Failed to create sync_jobs_in_flight metric");

    /// Gauge: size of the last snapshot pushed to the remote
    pub static ref LAST_PUSH_SIZE: Gauge = register_gauge!(
        "tasksync_last_push_tasks",
        "Number of tasks in the last snapshot pushed to the remote"
    )
    .expect("Failed to create last_push_tasks metric");
}

/// Record a finished job
pub fn record_job(job: &str, outcome: &str, duration_secs: f64) {
    SYNC_JOBS.with_label_values(&[job, outcome]).inc();
    SYNC_JOB_DURATION
        .with_label_values(&[job])
        .observe(duration_secs);
}

/// Set the number of running jobs
pub fn set_in_flight(count: usize) {
    SYNC_JOBS_IN_FLIGHT.set(count as f64);
}

/// Record the size of a pushed snapshot
pub fn record_push_size(tasks: usize) {
    LAST_PUSH_SIZE.set(tasks as f64);
}

/// Encode all metrics as Prometheus text format
pub fn encode_metrics() -> crate::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| crate::TaskSyncError::Other(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::TaskSyncError::Other(format!("Metrics are not UTF-8: {}", e)))
}
