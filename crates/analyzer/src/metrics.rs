//! Duration and outcome metrics for analysis runs.
//!
//! Metrics are plain structured log events named
//! `metrics.policy_analysis.success` and `metrics.policy_analysis.failure`
//! carrying a `duration_ms` field. A log-based metrics pipeline turns them
//! into counters and histograms downstream.

use std::time::Duration;

pub const SUCCESS_EVENT: &str = "metrics.policy_analysis.success";
pub const FAILURE_EVENT: &str = "metrics.policy_analysis.failure";

/// Records the outcome of each analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn record_success(&self, duration: Duration, model: &str) {
        tracing::info!(
            duration_ms = duration_ms(duration),
            model,
            "{SUCCESS_EVENT}"
        );
    }

    pub fn record_failure(&self, duration: Duration, reason: &str) {
        tracing::warn!(
            duration_ms = duration_ms(duration),
            reason,
            "{FAILURE_EVENT}"
        );
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
