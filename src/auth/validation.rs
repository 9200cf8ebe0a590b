//! Input validation for registration and credential changes.
//!
//! Validation collects every violation instead of stopping at the first,
//! so a form submission gets the complete list back in one round trip.

use thiserror::Error;

use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::RippleError;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// A single validation violation with a user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters")]
    UsernameLength,

    #[error("Username can only contain letters, numbers, underscores and spaces")]
    UsernameCharset,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email format")]
    EmailFormat,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Check a username against length and charset rules.
pub fn check_username(username: &str) -> Option<ValidationIssue> {
    if username.is_empty() {
        return Some(ValidationIssue::UsernameRequired);
    }
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Some(ValidationIssue::UsernameLength);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
    {
        return Some(ValidationIssue::UsernameCharset);
    }
    None
}

/// Check an email address for presence and basic shape.
///
/// Shape check only: one `@` with a non-empty local part and a domain
/// containing a dot. Deliverability is out of scope.
pub fn check_email(email: &str) -> Option<ValidationIssue> {
    if email.is_empty() {
        return Some(ValidationIssue::EmailRequired);
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    let domain_ok = {
        let (host, tld) = match domain.rsplit_once('.') {
            Some(split) => split,
            None => return Some(ValidationIssue::EmailFormat),
        };
        !host.is_empty() && !tld.is_empty() && !domain.contains(' ')
    };
    if local.is_empty() || local.contains(' ') || !domain_ok {
        return Some(ValidationIssue::EmailFormat);
    }
    None
}

/// Check a password for presence and minimum length.
pub fn check_password(password: &str) -> Option<ValidationIssue> {
    if password.is_empty() {
        return Some(ValidationIssue::PasswordRequired);
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Some(ValidationIssue::PasswordTooShort);
    }
    None
}

/// Validate a registration submission, collecting all violations.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), RippleError> {
    let mut issues = Vec::new();

    if let Some(issue) = check_username(username) {
        issues.push(issue);
    }
    if let Some(issue) = check_email(email) {
        issues.push(issue);
    }
    if let Some(issue) = check_password(password) {
        issues.push(issue);
    }
    if password != confirm_password {
        issues.push(ValidationIssue::PasswordMismatch);
    }

    into_result(issues)
}

/// Validate a new password and its confirmation, collecting all violations.
pub fn validate_new_password(password: &str, confirm_password: &str) -> Result<(), RippleError> {
    let mut issues = Vec::new();

    if let Some(issue) = check_password(password) {
        issues.push(issue);
    }
    if password != confirm_password {
        issues.push(ValidationIssue::PasswordMismatch);
    }

    into_result(issues)
}

fn into_result(issues: Vec<ValidationIssue>) -> Result<(), RippleError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(RippleError::Validation(
            issues.into_iter().map(|i| i.to_string()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_username_valid() {
        assert_eq!(check_username("alice"), None);
        assert_eq!(check_username("alice_b"), None);
        assert_eq!(check_username("Alice Smith 42"), None);
        assert_eq!(check_username("abc"), None);
        assert_eq!(check_username(&"a".repeat(50)), None);
    }

    #[test]
    fn test_check_username_required() {
        assert_eq!(check_username(""), Some(ValidationIssue::UsernameRequired));
    }

    #[test]
    fn test_check_username_length() {
        assert_eq!(check_username("ab"), Some(ValidationIssue::UsernameLength));
        assert_eq!(
            check_username(&"a".repeat(51)),
            Some(ValidationIssue::UsernameLength)
        );
    }

    #[test]
    fn test_check_username_charset() {
        assert_eq!(
            check_username("bad$name"),
            Some(ValidationIssue::UsernameCharset)
        );
        assert_eq!(
            check_username("no-dashes"),
            Some(ValidationIssue::UsernameCharset)
        );
        assert_eq!(
            check_username("émile"),
            Some(ValidationIssue::UsernameCharset)
        );
    }

    #[test]
    fn test_check_email() {
        assert_eq!(check_email("alice@example.com"), None);
        assert_eq!(check_email("a.b+tag@sub.example.org"), None);
        assert_eq!(check_email(""), Some(ValidationIssue::EmailRequired));
        assert_eq!(check_email("no-at-sign"), Some(ValidationIssue::EmailFormat));
        assert_eq!(check_email("@example.com"), Some(ValidationIssue::EmailFormat));
        assert_eq!(check_email("alice@"), Some(ValidationIssue::EmailFormat));
        assert_eq!(check_email("alice@nodot"), Some(ValidationIssue::EmailFormat));
        assert_eq!(check_email("alice@.com"), Some(ValidationIssue::EmailFormat));
        assert_eq!(
            check_email("sp ace@example.com"),
            Some(ValidationIssue::EmailFormat)
        );
    }

    #[test]
    fn test_check_password() {
        assert_eq!(check_password("secret"), None);
        assert_eq!(check_password(""), Some(ValidationIssue::PasswordRequired));
        assert_eq!(
            check_password("abc"),
            Some(ValidationIssue::PasswordTooShort)
        );
    }

    #[test]
    fn test_validate_registration_ok() {
        assert!(validate_registration("alice", "alice@example.com", "secret1", "secret1").is_ok());
    }

    #[test]
    fn test_validate_registration_collects_all_issues() {
        let err =
            validate_registration("ab", "bad-email", "abc", "different").unwrap_err();
        match err {
            RippleError::Validation(messages) => {
                assert_eq!(messages.len(), 4);
                assert!(messages
                    .contains(&"Username must be between 3 and 50 characters".to_string()));
                assert!(messages.contains(&"Invalid email format".to_string()));
                assert!(messages
                    .contains(&"Password must be at least 6 characters long".to_string()));
                assert!(messages.contains(&"Passwords do not match".to_string()));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_registration_empty_fields() {
        let err = validate_registration("", "", "", "").unwrap_err();
        match err {
            RippleError::Validation(messages) => {
                assert!(messages.contains(&"Username is required".to_string()));
                assert!(messages.contains(&"Email is required".to_string()));
                assert!(messages.contains(&"Password is required".to_string()));
                // Empty confirmation matches the empty password, so no mismatch
                assert_eq!(messages.len(), 3);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert!(validate_new_password("secret1", "secret2").is_err());
        assert!(validate_new_password("abc", "abc").is_err());
    }
}
