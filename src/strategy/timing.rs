//! Signal timing gate.
//!
//! A signal is only worth sending while the round's betting window is still
//! open with some margin left. Late signals are dropped, never queued.

use chrono::{DateTime, Duration, Utc};

/// Default round length in seconds.
pub const DEFAULT_ROUND_SECS: u64 = 30;
/// Default margin before close by which a signal must go out.
pub const DEFAULT_DEADLINE_SECS: u64 = 7;
/// Longest round length accepted from configuration.
pub const MAX_ROUND_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy)]
pub struct TimingGate {
    round_duration: Duration,
    deadline_margin: Duration,
}

impl Default for TimingGate {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_SECS, DEFAULT_DEADLINE_SECS)
    }
}

impl TimingGate {
    /// Both values are capped at [`MAX_ROUND_SECS`].
    pub fn new(round_duration_secs: u64, deadline_margin_secs: u64) -> Self {
        let secs = |s: u64| Duration::seconds(s.min(MAX_ROUND_SECS) as i64);
        Self {
            round_duration: secs(round_duration_secs),
            deadline_margin: secs(deadline_margin_secs),
        }
    }

    /// Latest elapsed time (exclusive) at which a signal may still be sent.
    pub fn window(&self) -> Duration {
        self.round_duration - self.deadline_margin
    }

    /// Approve iff `now - started_at` is strictly below the window.
    pub fn approves(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - started_at < self.window()
    }
}
