//! Route handlers organized by domain.

pub mod auth;
pub mod badges;
pub mod documents;
pub mod health;
pub mod tables;
pub mod view_state;
