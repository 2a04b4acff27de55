//! Studies view state: the list of studies shown in the study picker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use etmf_core::result::AppResult;
use etmf_entity::study::Study;

use super::double_option;
use crate::context::RequestContext;
use crate::table::TableDispatcher;

/// Where the studies container loads from and saves to.
#[async_trait]
pub trait StudySource: Send + Sync {
    /// All studies visible to the caller.
    async fn fetch_studies(&self, ctx: &RequestContext) -> AppResult<Vec<Study>>;

    /// Persists one study and returns it as stored.
    async fn save_study(&self, ctx: &RequestContext, study: Study) -> AppResult<Study>;
}

#[async_trait]
impl StudySource for TableDispatcher {
    async fn fetch_studies(&self, ctx: &RequestContext) -> AppResult<Vec<Study>> {
        self.get_table::<Study>(ctx).await
    }

    async fn save_study(&self, ctx: &RequestContext, study: Study) -> AppResult<Study> {
        Ok(self.save(ctx, study).await?.into_inner())
    }
}

/// Studies container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudiesState {
    /// Loaded studies.
    pub studies: Vec<Study>,
    /// Whether a load is in flight.
    pub is_loading: bool,
    /// Message of the last failed load.
    pub error: Option<String>,
}

/// Partial update of a [`StudiesState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudiesPatch {
    /// Replacement study list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studies: Option<Vec<Study>>,
    /// New loading flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    /// New error message; `null` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub error: Option<Option<String>>,
}

impl StudiesState {
    /// Applies `patch` field by field.
    pub fn merge(&self, patch: StudiesPatch) -> Self {
        Self {
            studies: patch.studies.unwrap_or_else(|| self.studies.clone()),
            is_loading: patch.is_loading.unwrap_or(self.is_loading),
            error: patch.error.unwrap_or_else(|| self.error.clone()),
        }
    }

    /// The default state.
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Reloads the list from `source`.
    ///
    /// A failure is recorded in `error` and leaves the current list as is.
    pub async fn load(&self, source: &dyn StudySource, ctx: &RequestContext) -> Self {
        let loading = self.merge(StudiesPatch {
            is_loading: Some(true),
            ..StudiesPatch::default()
        });
        match source.fetch_studies(ctx).await {
            Ok(studies) => loading.merge(StudiesPatch {
                studies: Some(studies),
                is_loading: Some(false),
                error: Some(None),
            }),
            Err(e) => {
                warn!(user_id = %ctx.user_id, error = %e, "Failed to load studies");
                loading.merge(StudiesPatch {
                    studies: None,
                    is_loading: Some(false),
                    error: Some(Some(e.message)),
                })
            }
        }
    }

    /// Persists `study` through `source` and puts the stored row into the
    /// list, replacing the entry with the same id or appending.
    pub async fn save(
        &self,
        source: &dyn StudySource,
        ctx: &RequestContext,
        study: Study,
    ) -> AppResult<(Self, Study)> {
        let saved = source.save_study(ctx, study).await?;
        let mut studies = self.studies.clone();
        match studies.iter_mut().find(|s| s.id == saved.id) {
            Some(slot) => *slot = saved.clone(),
            None => studies.push(saved.clone()),
        }
        let state = self.merge(StudiesPatch {
            studies: Some(studies),
            ..StudiesPatch::default()
        });
        Ok((state, saved))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use etmf_core::error::AppError;
    use etmf_database::TableStore;
    use etmf_entity::user::UserRole;

    struct OfflineSource;

    #[async_trait]
    impl StudySource for OfflineSource {
        async fn fetch_studies(&self, _ctx: &RequestContext) -> AppResult<Vec<Study>> {
            Err(AppError::database("connection refused"))
        }

        async fn save_study(&self, _ctx: &RequestContext, _study: Study) -> AppResult<Study> {
            Err(AppError::database("connection refused"))
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Manager,
            "pm@example.org".into(),
            "127.0.0.1".into(),
            None,
        )
    }

    fn study(protocol: &str) -> Study {
        Study {
            id: Uuid::nil(),
            protocol_number: protocol.into(),
            title: format!("Study {protocol}"),
            sponsor: None,
            phase: Some("II".into()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_replaces_list() {
        let dispatcher = TableDispatcher::new(TableStore::memory());
        let ctx = ctx();
        let (state, _) = StudiesState::default()
            .save(&dispatcher, &ctx, study("P-1"))
            .await
            .unwrap();
        assert_eq!(state.studies.len(), 1);

        dispatcher.save_study(&ctx, study("P-2")).await.unwrap();
        let loaded = state.load(&dispatcher, &ctx).await;
        assert_eq!(loaded.studies.len(), 2);
        assert!(!loaded.is_loading);
        assert!(loaded.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_list_and_records_error() {
        let ctx = ctx();
        let state = StudiesState {
            studies: vec![study("P-1")],
            ..StudiesState::default()
        };
        let loaded = state.load(&OfflineSource, &ctx).await;
        assert_eq!(loaded.studies, state.studies);
        assert!(!loaded.is_loading);
        assert_eq!(loaded.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_save_replaces_existing_entry() {
        let dispatcher = TableDispatcher::new(TableStore::memory());
        let ctx = ctx();
        let (state, saved) = StudiesState::default()
            .save(&dispatcher, &ctx, study("P-1"))
            .await
            .unwrap();

        let mut renamed = saved.clone();
        renamed.title = "Renamed".into();
        let (state, again) = state.save(&dispatcher, &ctx, renamed).await.unwrap();
        assert_eq!(again.id, saved.id);
        assert_eq!(state.studies.len(), 1);
        assert_eq!(state.studies[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_failed_save_propagates() {
        let state = StudiesState::default();
        let err = state.save(&OfflineSource, &ctx(), study("P-1")).await.unwrap_err();
        assert_eq!(err.kind, etmf_core::error::ErrorKind::Database);
    }

    #[test]
    fn test_merge_and_reset() {
        let state = StudiesState::default().merge(serde_json::from_str(r#"{"error":"boom"}"#).unwrap());
        assert_eq!(state.error.as_deref(), Some("boom"));
        let cleared = state.merge(serde_json::from_str(r#"{"error":null}"#).unwrap());
        assert!(cleared.error.is_none());
        assert_eq!(state.reset(), StudiesState::default());
    }
}
