//! Metrics definitions for the room service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `rooms_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: `success` or a `RoomError::error_type()` label
//! - `outcome` (attempts): `success`, `retryable_error`, `duplicate_id`
//! - `outcome` (server tags): `none`, `required`, `desired`, `dropped`

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Meeting Start Metrics
// ============================================================================

/// Record a completed start flow.
///
/// Metric: `rooms_meeting_starts_total`, `rooms_meeting_start_duration_seconds`
/// Labels: `status`
pub fn record_meeting_start(status: &str, duration: Duration) {
    histogram!("rooms_meeting_start_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rooms_meeting_starts_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record one backend create call.
///
/// Metric: `rooms_bbb_start_attempts_total`
/// Labels: `outcome`
pub fn record_start_attempt(outcome: &str) {
    counter!("rooms_bbb_start_attempts_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Routing Metrics
// ============================================================================

/// Record the server tag decision of a start.
///
/// Metric: `rooms_server_tag_decisions_total`
/// Labels: `outcome`
pub fn record_server_tag(outcome: &str) {
    counter!("rooms_server_tag_decisions_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
