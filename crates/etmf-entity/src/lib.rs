//! # etmf-entity
//!
//! Domain entity models for the eTMF portal. Every struct in this crate is a
//! row of one of the known tables listed in [`table::Table`]; each derives
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, `sqlx::FromRow` and
//! `validator::Validate`, and implements [`table::TableRow`] so the generic
//! dispatcher can read and write it without knowing which table it targets.

pub mod document;
pub mod folder;
pub mod session;
pub mod site;
pub mod study;
pub mod table;
pub mod user;

pub use table::{Table, TableOperation, TableRow};
