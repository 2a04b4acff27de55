//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use etmf_auth::{PasswordHasher, PasswordPolicy, SessionCleanup, SessionManager};
use etmf_core::config::AppConfig;
use etmf_database::TableStore;
use etmf_service::{DocumentService, TableDispatcher, ViewStateRegistry};
use etmf_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Relational table store
    pub store: TableStore,
    /// Storage provider manager
    pub storage_manager: StorageManager,

    // ── Auth ─────────────────────────────────────────────────
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// Password policy applied when a password is set
    pub password_policy: Arc<PasswordPolicy>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,

    // ── Services ─────────────────────────────────────────────
    /// Generic table CRUD
    pub dispatcher: TableDispatcher,
    /// Document versioning
    pub document_service: Arc<DocumentService>,
    /// Per-session view state
    pub view_states: ViewStateRegistry,
}

impl AppState {
    /// Wires every service over an already opened store and storage manager.
    pub fn new(config: AppConfig, store: TableStore, storage_manager: StorageManager) -> Self {
        let password_hasher = Arc::new(PasswordHasher::new());
        let password_policy = Arc::new(PasswordPolicy::new(&config.auth));
        let session_manager = Arc::new(SessionManager::new(
            store.clone(),
            Arc::clone(&password_hasher),
            &config.auth,
            config.session.clone(),
        ));
        let dispatcher = TableDispatcher::new(store.clone());
        let document_service = Arc::new(DocumentService::new(
            dispatcher.clone(),
            storage_manager.clone(),
            config.storage.max_upload_size_bytes,
        ));

        Self {
            config: Arc::new(config),
            store,
            storage_manager,
            password_hasher,
            password_policy,
            session_manager,
            dispatcher,
            document_service,
            view_states: ViewStateRegistry::new(),
        }
    }

    /// Expired-session cleanup that also drops the purged sessions' view
    /// state.
    pub fn session_cleanup(&self) -> SessionCleanup {
        let view_states = self.view_states.clone();
        SessionCleanup::new(
            (*self.session_manager).clone(),
            self.config.session.cleanup_interval(),
        )
        .on_purged(move |ids| {
            for id in ids {
                view_states.remove(*id);
            }
        })
    }
}
