//! # etmf-auth
//!
//! Authentication and session lifecycle for the eTMF portal.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and the minimum-length policy
//! - `jwt`: signed session tokens carried in the `auth-token` cookie
//! - `session`: login, validation, logout, and expired-session cleanup

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordPolicy};
pub use session::{AuthenticatedSession, LoginResult, SessionCleanup, SessionManager};
