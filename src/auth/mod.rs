//! Authentication and account lifecycle.
//!
//! Registration, credential verification, session establishment, the
//! password-reset token flow, and account deletion. The web layer talks to
//! [`AuthService`]; everything else in here supports it.

pub mod password;
pub mod service;
pub mod session;
pub mod token;
pub mod validation;

pub use password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH};
pub use service::{AuthService, RegisterRequest, ResetRequestOutcome, LOGIN_FAILED};
pub use session::{Session, SessionState, SessionStore};
pub use token::generate_reset_token;
pub use validation::{validate_new_password, validate_registration, ValidationIssue};
