//! Progress logging utilities.

use log::info;
use std::time::Instant;

use crate::error_handling::AuditStats;

/// Logs how many domains have been audited and the current rate.
pub fn log_progress(start_time: Instant, stats: &AuditStats) {
    let completed = stats.domains();
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Audited {} domains in {:.2} seconds (~{:.2} domains/sec)",
        completed, elapsed_secs, rate
    );
}
