//! Password reset token repository.
//!
//! Tokens are single-use capabilities keyed by email. The UNIQUE(email)
//! constraint guarantees at most one live token per account; issuing a new
//! token replaces the previous one (last writer wins). Consumption deletes
//! the row in a single statement so a token can never be redeemed twice,
//! even under concurrent submission.

use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::Result;

/// Timestamp format used for the `expires_at` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Password reset token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordReset {
    /// Row ID.
    pub id: i64,
    /// Owning email address.
    pub email: String,
    /// Opaque token string (64 hex chars, 256 bits of entropy).
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl PasswordReset {
    /// Check whether the token is past its expiry.
    ///
    /// An unparseable timestamp counts as expired; a token whose validity
    /// window can't be established must not grant access.
    pub fn is_expired(&self) -> bool {
        match NaiveDateTime::parse_from_str(&self.expires_at, TIMESTAMP_FORMAT) {
            Ok(expires_at) => Utc::now().naive_utc() >= expires_at,
            Err(_) => true,
        }
    }
}

/// Repository for password reset token operations.
pub struct PasswordResetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a token for an email, replacing any existing one.
    pub async fn replace_for_email(
        &self,
        email: &str,
        token: &str,
        expires_at: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO password_resets (email, token, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                 token = excluded.token,
                 expires_at = excluded.expires_at,
                 created_at = datetime('now')",
        )
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get a reset token record by token string.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<PasswordReset>> {
        let result = sqlx::query_as::<_, PasswordReset>(
            "SELECT id, email, token, expires_at, created_at
             FROM password_resets WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Consume a token, returning the owning email.
    ///
    /// The delete-and-return happens in one statement, so of two concurrent
    /// callers exactly one receives the email; the other gets `None`.
    pub async fn consume(&self, token: &str) -> Result<Option<String>> {
        let email: Option<String> =
            sqlx::query_scalar("DELETE FROM password_resets WHERE token = ? RETURNING email")
                .bind(token)
                .fetch_optional(self.pool)
                .await?;

        Ok(email)
    }

    /// Delete a token by token string.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM password_resets WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all expired tokens.
    ///
    /// Expiry is otherwise checked lazily at lookup; this is for manual
    /// housekeeping only, no background sweeper calls it.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at < datetime('now')")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
