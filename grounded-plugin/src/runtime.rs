//! Process-lifetime runtime counters.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Start time and tool-call counter for a running server.
///
/// Created once at startup and shared by `Arc`. The only mutation is the
/// atomic counter, so no lock is needed.
#[derive(Debug)]
pub struct ServerRuntime {
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    calls: AtomicU64,
}

impl ServerRuntime {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            calls: AtomicU64::new(0),
        }
    }

    pub fn started_at_utc(&self) -> DateTime<Utc> {
        self.started_at_utc
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Records one tool call and returns the new total.
    pub fn increment_and_get_call_count(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for ServerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a duration as `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
