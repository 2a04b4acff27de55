//! Storage manager: routes operations to a provider by name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use etmf_core::config::StorageConfig;
use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_core::traits::storage::StorageProvider;

use crate::providers::LocalStorageProvider;

/// Holds every registered provider and remembers which one receives new
/// document versions.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// Provider name → provider instance.
    providers: Arc<RwLock<HashMap<String, Arc<dyn StorageProvider>>>>,
    /// Name of the default provider.
    default_name: Arc<RwLock<Option<String>>>,
}

impl StorageManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            default_name: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a manager with the provider selected by `config.provider`
    /// registered as the default.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let manager = Self::new();
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
            #[cfg(feature = "s3")]
            "s3" => Arc::new(crate::providers::S3StorageProvider::new(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unsupported storage provider: '{other}'"
                )));
            }
        };
        info!(provider = %config.provider, "Storage provider registered");
        manager.register(&config.provider, provider, true).await;
        Ok(manager)
    }

    /// Register a provider under `name`.
    pub async fn register(&self, name: &str, provider: Arc<dyn StorageProvider>, is_default: bool) {
        let mut providers = self.providers.write().await;
        providers.insert(name.to_string(), provider);
        if is_default {
            let mut default = self.default_name.write().await;
            *default = Some(name.to_string());
        }
    }

    /// Get a provider by name.
    pub async fn get(&self, name: &str) -> AppResult<Arc<dyn StorageProvider>> {
        let providers = self.providers.read().await;
        providers
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Storage provider '{name}' not found")))
    }

    /// Get the default provider.
    pub async fn get_default(&self) -> AppResult<Arc<dyn StorageProvider>> {
        let name = {
            let default = self.default_name.read().await;
            default
                .clone()
                .ok_or_else(|| AppError::configuration("No default storage configured"))?
        };
        self.get(&name).await
    }

    /// Check health of every registered provider.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let providers = self.providers.read().await;
        let mut results = HashMap::new();
        for (name, provider) in providers.iter() {
            let healthy = provider.health_check().await.unwrap_or(false);
            results.insert(name.clone(), healthy);
        }
        results
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
