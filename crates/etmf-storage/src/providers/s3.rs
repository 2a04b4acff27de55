//! S3-compatible object storage provider (requires the `s3` feature).

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use etmf_core::config::S3StorageConfig;
use etmf_core::error::{AppError, ErrorKind};
use etmf_core::result::AppResult;
use etmf_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

/// Stores each object key as an object in a single bucket.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
}

impl S3StorageProvider {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when an access key is configured;
    /// otherwise the default AWS credential chain applies. A custom endpoint
    /// switches to path-style addressing for MinIO and similar stores.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket is required"));
        }
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 storage provider"
        );

        let region = Region::new(config.region.clone());
        let mut builder = if config.access_key.is_empty() {
            let shared = aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .load()
                .await;
            aws_sdk_s3::config::Builder::from(&shared)
        } else {
            let credentials = Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "etmf-config",
            );
            aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(credentials)
        };

        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }

    fn sdk_error(action: &str, key: &str, e: impl std::error::Error + Send + Sync + 'static) -> AppError {
        AppError::with_source(ErrorKind::Storage, format!("S3 {action} failed: {key}"), e)
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(bucket = %self.bucket, error = %e, "S3 health check failed");
                Ok(false)
            }
        }
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Object not found: {path}"))
                } else {
                    Self::sdk_error("get", path, e)
                }
            })?;

        let stream = ReaderStream::new(output.body.into_async_read());
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Object not found: {path}"))
                } else {
                    Self::sdk_error("get", path, e)
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| Self::sdk_error("read body", path, e))?;
        Ok(data.into_bytes())
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(S3ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Self::sdk_error("put", path, e))?;

        debug!(path, bytes = len, "Wrote object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| Self::sdk_error("delete", path, e))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        match self.client.head_object().bucket(&self.bucket).key(path).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(Self::sdk_error("head", path, e)),
        }
    }

    async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    AppError::not_found(format!("Object not found: {path}"))
                } else {
                    Self::sdk_error("head", path, e)
                }
            })?;

        let last_modified = output
            .last_modified()
            .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

        Ok(StorageObjectMeta {
            path: path.to_string(),
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            last_modified,
        })
    }
}
