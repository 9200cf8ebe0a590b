//! HTTP transport layer.
//!
//! Thin adapters over [`crate::auth::AuthService`]: DTOs, error rendering,
//! cookie-based session plumbing, and the router.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::{AppState, SESSION_COOKIE};
pub use router::create_router;
pub use server::WebServer;
