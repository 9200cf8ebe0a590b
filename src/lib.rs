//! ripple - authentication and session lifecycle for a small social network.
//!
//! The crate owns registration, login, the password-reset token flow,
//! credential changes, and account deletion, persisted in SQLite and served
//! over an HTTP API. Page rendering, the post feed, messaging, and search
//! live elsewhere; their tables are here only so account deletion can
//! cascade through them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod upload;
pub mod web;

pub use auth::{AuthService, Session, SessionState, SessionStore};
pub use config::Config;
pub use db::Database;
pub use error::{Result, RippleError};
