//! Periodic removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use etmf_core::result::AppResult;

use super::manager::SessionManager;

/// Called with the ids of every batch of purged sessions.
pub type PurgeHook = Arc<dyn Fn(&[Uuid]) + Send + Sync>;

/// Background task purging expired and logged-out sessions.
#[derive(Clone)]
pub struct SessionCleanup {
    manager: SessionManager,
    interval: Duration,
    on_purged: Option<PurgeHook>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("interval", &self.interval)
            .field("has_hook", &self.on_purged.is_some())
            .finish()
    }
}

impl SessionCleanup {
    /// Creates a cleanup task running every `interval`.
    pub fn new(manager: SessionManager, interval: Duration) -> Self {
        Self {
            manager,
            interval,
            on_purged: None,
        }
    }

    /// Registers a callback for state keyed by session id.
    pub fn on_purged(mut self, hook: impl Fn(&[Uuid]) + Send + Sync + 'static) -> Self {
        self.on_purged = Some(Arc::new(hook));
        self
    }

    /// Runs a single purge and notifies the hook. Returns the number removed.
    pub async fn run_once(&self) -> AppResult<usize> {
        let removed = self.manager.purge_expired().await?;
        if let Some(hook) = &self.on_purged {
            if !removed.is_empty() {
                hook(&removed);
            }
        }
        Ok(removed.len())
    }

    /// Spawns the cleanup loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "Session cleanup task started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Session cleanup cycle failed");
                }
            }
        })
    }
}
