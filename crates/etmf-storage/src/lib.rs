//! # etmf-storage
//!
//! Object storage for document versions: the deterministic version key
//! builder, content checksums, and the storage providers (local filesystem
//! and S3-compatible stores) behind the [`StorageProvider`] trait.
//!
//! [`StorageProvider`]: etmf_core::traits::storage::StorageProvider

pub mod checksum;
pub mod keys;
pub mod manager;
pub mod providers;

pub use keys::{build_version_key, extension_of, VersionKey};
pub use manager::StorageManager;
