//! Navigation view state: where in the TMF hierarchy the user is looking.

use serde::{Deserialize, Serialize};

use etmf_entity::folder::TmfLevel;

use super::double_option;

/// Navigation container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Whether a modal dialog is open.
    pub is_modal: bool,
    /// Selected study.
    pub current_project: Option<String>,
    /// Selected country.
    pub current_country: Option<String>,
    /// Selected site.
    pub current_site: Option<String>,
    /// Selected folder.
    pub selected_folder: Option<String>,
    /// Hierarchy level being browsed.
    pub current_level: Option<TmfLevel>,
}

/// Partial update of a [`NavigationState`].
///
/// An absent field leaves the current value alone; for the optional
/// fields an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationPatch {
    /// New modal flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_modal: Option<bool>,
    /// New current project; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub current_project: Option<Option<String>>,
    /// New current country; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub current_country: Option<Option<String>>,
    /// New current site; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub current_site: Option<Option<String>>,
    /// New selected folder; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub selected_folder: Option<Option<String>>,
    /// New TMF level; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub current_level: Option<Option<TmfLevel>>,
}

impl NavigationState {
    /// Applies `patch` field by field; the patch wins wherever it speaks.
    pub fn merge(&self, patch: NavigationPatch) -> Self {
        Self {
            is_modal: patch.is_modal.unwrap_or(self.is_modal),
            current_project: patch
                .current_project
                .unwrap_or_else(|| self.current_project.clone()),
            current_country: patch
                .current_country
                .unwrap_or_else(|| self.current_country.clone()),
            current_site: patch.current_site.unwrap_or_else(|| self.current_site.clone()),
            selected_folder: patch
                .selected_folder
                .unwrap_or_else(|| self.selected_folder.clone()),
            current_level: patch.current_level.unwrap_or(self.current_level),
        }
    }

    /// The default state.
    pub fn reset(&self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> NavigationPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_default_state() {
        let state = NavigationState::default();
        assert!(!state.is_modal);
        assert!(state.current_project.is_none());
        assert!(state.current_level.is_none());
    }

    #[test]
    fn test_merge_only_touches_named_fields() {
        let state = NavigationState::default().merge(patch(
            r#"{"currentProject":"P-001","currentLevel":"site","isModal":true}"#,
        ));
        assert_eq!(state.current_project.as_deref(), Some("P-001"));
        assert_eq!(state.current_level, Some(TmfLevel::Site));
        assert!(state.is_modal);

        let next = state.merge(patch(r#"{"currentSite":"101"}"#));
        assert_eq!(next.current_project.as_deref(), Some("P-001"));
        assert_eq!(next.current_site.as_deref(), Some("101"));
        assert!(next.is_modal);
    }

    #[test]
    fn test_null_clears_and_empty_patch_is_identity() {
        let state = NavigationState::default().merge(patch(r#"{"currentProject":"P-001"}"#));
        assert_eq!(state.merge(NavigationPatch::default()), state);

        let cleared = state.merge(patch(r#"{"currentProject":null}"#));
        assert!(cleared.current_project.is_none());
    }

    #[test]
    fn test_later_patch_wins() {
        let state = NavigationState::default()
            .merge(patch(r#"{"selectedFolder":"a"}"#))
            .merge(patch(r#"{"selectedFolder":"b"}"#));
        assert_eq!(state.selected_folder.as_deref(), Some("b"));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let state = NavigationState::default().merge(patch(r#"{"isModal":true,"currentCountry":"FR"}"#));
        assert_eq!(state.reset(), NavigationState::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(NavigationState::default()).unwrap();
        assert_eq!(json["isModal"], false);
        assert!(json.get("currentProject").is_some());
    }
}
