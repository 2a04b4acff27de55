//! Generic CRUD over the known tables.

pub mod dispatcher;

pub use dispatcher::{TableDispatcher, Upserted, parse_record_id};
