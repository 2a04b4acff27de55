//! Server-side view state, one entry per session.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::navigation::{NavigationPatch, NavigationState};
use super::studies::StudiesState;

/// Both view containers of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Navigation container.
    pub navigation: NavigationState,
    /// Studies container.
    pub studies: StudiesState,
}

/// Holds the [`ViewState`] of every live session.
///
/// Entries are created with defaults on first access and replaced
/// wholesale; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct ViewStateRegistry {
    states: Arc<DashMap<Uuid, ViewState>>,
}

impl ViewStateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `session_id`.
    pub fn get(&self, session_id: Uuid) -> ViewState {
        self.states.entry(session_id).or_default().clone()
    }

    /// Merges `patch` into the session's navigation state.
    pub fn update_navigation(&self, session_id: Uuid, patch: NavigationPatch) -> NavigationState {
        let mut entry = self.states.entry(session_id).or_default();
        entry.navigation = entry.navigation.merge(patch);
        entry.navigation.clone()
    }

    /// Resets the session's navigation state.
    pub fn reset_navigation(&self, session_id: Uuid) -> NavigationState {
        let mut entry = self.states.entry(session_id).or_default();
        entry.navigation = entry.navigation.reset();
        entry.navigation.clone()
    }

    /// Replaces the session's studies state.
    pub fn set_studies(&self, session_id: Uuid, studies: StudiesState) {
        self.states.entry(session_id).or_default().studies = studies;
    }

    /// Drops the session's state.
    pub fn remove(&self, session_id: Uuid) {
        if self.states.remove(&session_id).is_some() {
            debug!(session_id = %session_id, "View state dropped");
        }
    }

    /// Number of sessions holding state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no session holds state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
