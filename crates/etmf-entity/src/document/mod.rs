//! Document domain entities.

pub mod model;
pub mod status;
pub mod version;

pub use model::Document;
pub use status::DocumentStatus;
pub use version::DocumentVersion;
