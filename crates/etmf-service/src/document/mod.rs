//! Document lifecycle and version storage.

pub mod service;
pub mod version;

pub use service::DocumentService;
pub use version::UploadVersion;
