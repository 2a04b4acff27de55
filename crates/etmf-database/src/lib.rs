//! # etmf-database
//!
//! Relational store for the eTMF portal: PostgreSQL connection management,
//! migrations, and the [`TableStore`] that reads and writes any
//! [`TableRow`](etmf_entity::TableRow) against either PostgreSQL or an
//! in-process backend.

pub mod connection;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::{FilterValue, TableStore};
