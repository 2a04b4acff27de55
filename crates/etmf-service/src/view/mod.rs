//! Per-session view state and display helpers.
//!
//! The containers are plain values: every operation returns a new state
//! and never mutates in place, so the registry can swap a session's state
//! wholesale.

pub mod badge;
pub mod navigation;
pub mod registry;
pub mod studies;

pub use badge::StatusBadge;
pub use navigation::{NavigationPatch, NavigationState};
pub use registry::{ViewState, ViewStateRegistry};
pub use studies::{StudiesPatch, StudiesState, StudySource};

use serde::{Deserialize, Deserializer};

/// Deserializes a patch field so that an absent key stays `None` while an
/// explicit `null` becomes `Some(None)`.
///
/// Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
