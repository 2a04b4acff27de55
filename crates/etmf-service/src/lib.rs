//! # etmf-service
//!
//! Business logic for the eTMF portal. Services receive a
//! [`RequestContext`] describing who is acting and orchestrate the table
//! store and object storage to implement each use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time.

pub mod context;
pub mod document;
pub mod table;
pub mod view;

pub use context::RequestContext;
pub use document::{DocumentService, UploadVersion};
pub use table::{TableDispatcher, Upserted, parse_record_id};
pub use view::{NavigationState, StatusBadge, StudiesState, StudySource, ViewState, ViewStateRegistry};
