//! Progress percentages and remaining-time estimation

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Shown instead of an estimate while no progress has been reported
pub const ETA_PLACEHOLDER: &str = "estimating...";

/// Convert an engine fraction to a whole percentage in `0..=100`
pub fn to_percent(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Remaining time given elapsed time and completed fraction.
///
/// Total duration is extrapolated linearly as `elapsed / fraction`. Returns
/// `None` when nothing has completed yet. No smoothing is applied, so early
/// estimates are noisy.
pub fn estimate_remaining(elapsed: Duration, fraction: f64) -> Option<Duration> {
    if fraction.is_nan() || fraction <= 0.0 {
        return None;
    }
    let elapsed_secs = elapsed.as_secs_f64();
    let total = elapsed_secs / fraction;
    let remaining = (total - elapsed_secs).max(0.0);
    Some(Duration::from_secs_f64(remaining))
}

/// `"12.3s remaining"`
pub fn format_remaining(remaining: Duration) -> String {
    format!("{:.1}s remaining", remaining.as_secs_f64())
}

/// One progress observation for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Progress percentage (0 - 100)
    pub percent: u8,
    /// Seconds since the job started
    pub elapsed_secs: f64,
    /// Estimated seconds remaining
    pub eta_secs: Option<f64>,
}

impl ProgressSnapshot {
    pub fn eta_label(&self) -> String {
        match self.eta_secs {
            Some(secs) => format_remaining(Duration::from_secs_f64(secs)),
            None => ETA_PLACEHOLDER.to_string(),
        }
    }
}

/// Tracks elapsed time for one job and turns percentages into snapshots
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Snapshot for `percent` at the current instant
    pub fn observe(&self, percent: u8) -> ProgressSnapshot {
        Self::snapshot(percent, self.elapsed())
    }

    /// Snapshot for `percent` after `elapsed`
    pub fn snapshot(percent: u8, elapsed: Duration) -> ProgressSnapshot {
        let fraction = f64::from(percent.min(100)) / 100.0;
        ProgressSnapshot {
            percent,
            elapsed_secs: elapsed.as_secs_f64(),
            eta_secs: estimate_remaining(elapsed, fraction).map(|eta| eta.as_secs_f64()),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
