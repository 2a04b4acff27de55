//! Session lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifetimes of portal login sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hours after login at which a session ends regardless of activity.
    #[serde(default = "default_absolute_timeout")]
    pub absolute_timeout_hours: u64,
    /// Minutes without a request after which a session is closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Minutes between sweeps that delete closed sessions.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl SessionConfig {
    /// Absolute lifetime; also the cookie `Max-Age`.
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.absolute_timeout_hours.min(i64::MAX as u64 / 3_600_000) as i64)
    }

    /// Idle timeout.
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_timeout_minutes.min(i64::MAX as u64 / 60_000) as i64)
    }

    /// Sweep period, at least one minute.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes.max(1) * 60)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            absolute_timeout_hours: default_absolute_timeout(),
            idle_timeout_minutes: default_idle_timeout(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_absolute_timeout() -> u64 {
    12
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_cleanup_interval() -> u64 {
    15
}
