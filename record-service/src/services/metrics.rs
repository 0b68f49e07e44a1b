//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::{Mutex, OnceLock};

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Latency buckets, in seconds, for request and store histograms.
pub const DURATION_BUCKETS: &[f64] = &[0.1, 0.3, 1.2, 5.0, 10.0];

/// Serializes recorder installation across concurrent callers.
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Install the Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), AppError> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .and_then(|builder| {
            builder.set_buckets_for_metric(
                Matcher::Full("record_store_operation_duration_seconds".to_string()),
                DURATION_BUCKETS,
            )
        })
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| {
            tracing::error!("Failed to install Prometheus recorder: {}", e);
            AppError::InternalError(anyhow::Error::new(e))
        })?;

    METRICS_HANDLE.get_or_init(|| handle);
    Ok(())
}

/// Get the current metrics in Prometheus text format.
///
/// Returns a string suitable for the /metrics HTTP endpoint.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_initialization_installs_once() {
        let workers: Vec<_> = (0..8).map(|_| thread::spawn(init_metrics)).collect();
        for worker in workers {
            assert!(worker.join().unwrap().is_ok());
        }

        assert!(METRICS_HANDLE.get().is_some());
        assert!(init_metrics().is_ok());
        assert!(!get_metrics().contains("not initialized"));
    }
}
