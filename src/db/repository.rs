//! User repository for ripple.
//!
//! CRUD operations for user accounts. All queries are parameter-bound and
//! uniqueness of username/email is enforced by the schema, so a concurrent
//! check-then-insert race still resolves to exactly one winner.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{Result, RippleError};

const USER_COLUMNS: &str = "id, username, email, password, profile_picture, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID. A uniqueness
    /// violation (lost registration race) maps to `Conflict`.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password, profile_picture)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.profile_picture)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| RippleError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get a user by login identifier (username or email).
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ?"
        ))
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get a user by email address.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Check if a username is already taken.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(exists.0)
    }

    /// Check if an email is in use, optionally excluding one account.
    ///
    /// The exclusion supports the email-change flow, where the caller's own
    /// record must not count as a collision.
    pub async fn email_in_use(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        let exists: (bool,) = match exclude_id {
            Some(id) => {
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND id != ?)")
                    .bind(email)
                    .bind(id)
                    .fetch_one(self.pool)
                    .await?
            }
            None => sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await?,
        };
        Ok(exists.0)
    }

    /// Replace the password hash for a user.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the password hash for the account owning an email address.
    pub async fn update_password_by_email(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's email address.
    pub async fn update_email(&self, id: i64, email: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's profile picture reference.
    pub async fn update_profile_picture(&self, id: i64, picture: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET profile_picture = ? WHERE id = ?")
            .bind(picture)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by ID.
    ///
    /// Dependent posts and messages cascade at the schema level.
    /// Returns true if a user was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

/// Map a sqlx unique-constraint violation to a field-specific conflict.
fn map_unique_violation(e: sqlx::Error) -> RippleError {
    let is_unique = e
        .as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        let message = e.to_string();
        if message.contains("users.username") {
            RippleError::Conflict("username already exists".to_string())
        } else if message.contains("users.email") {
            RippleError::Conflict("email already exists".to_string())
        } else {
            RippleError::Conflict("account already exists".to_string())
        }
    } else {
        RippleError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let new_user = NewUser::new("alice", "alice@example.com", "hashedpw");
        let user = repo.create(&new_user).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.profile_picture, "default_avatar.png");
        assert!(!user.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_username_is_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let result = repo
            .create(&NewUser::new("alice", "other@example.com", "pw"))
            .await;

        match result {
            Err(RippleError::Conflict(msg)) => assert_eq!(msg, "username already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let result = repo
            .create(&NewUser::new("bob", "alice@example.com", "pw"))
            .await;

        match result {
            Err(RippleError::Conflict(msg)) => assert_eq!(msg, "email already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_by_identifier_matches_username_and_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let by_name = repo.get_by_identifier("alice").await.unwrap();
        assert!(by_name.is_some());

        let by_email = repo.get_by_identifier("alice@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert_eq!(by_email.unwrap().username, "alice");

        let missing = repo.get_by_identifier("nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_email_in_use_with_exclusion() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        assert!(repo.email_in_use("alice@example.com", None).await.unwrap());
        // Own record doesn't count when changing email
        assert!(!repo
            .email_in_use("alice@example.com", Some(user.id))
            .await
            .unwrap());
        assert!(!repo.email_in_use("other@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "alice@example.com", "oldhash"))
            .await
            .unwrap();

        assert!(repo.update_password(user.id, "newhash").await.unwrap());

        let updated = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.password, "newhash");
    }

    #[tokio::test]
    async fn test_update_password_by_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com", "oldhash"))
            .await
            .unwrap();

        assert!(repo
            .update_password_by_email("alice@example.com", "newhash")
            .await
            .unwrap());
        assert!(!repo
            .update_password_by_email("nobody@example.com", "newhash")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();
        let bob = repo
            .create(&NewUser::new("bob", "bob@example.com", "pw"))
            .await
            .unwrap();

        let result = repo.update_email(bob.id, "alice@example.com").await;
        assert!(matches!(result, Err(RippleError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_profile_picture() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        assert!(repo
            .update_profile_picture(user.id, "avatar_new.png")
            .await
            .unwrap());

        let updated = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.profile_picture, "avatar_new.png");
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        // Deleting again reports nothing deleted
        assert!(!repo.delete(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_posts_and_messages() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let alice = repo
            .create(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();
        let bob = repo
            .create(&NewUser::new("bob", "bob@example.com", "pw"))
            .await
            .unwrap();

        sqlx::query("INSERT INTO posts (user_id, content) VALUES (?, 'first post')")
            .bind(alice.id)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO messages (sender_id, receiver_id, body) VALUES (?, ?, 'hi bob')")
            .bind(alice.id)
            .bind(bob.id)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO messages (sender_id, receiver_id, body) VALUES (?, ?, 'hi alice')")
            .bind(bob.id)
            .bind(alice.id)
            .execute(db.pool())
            .await
            .unwrap();

        repo.delete(alice.id).await.unwrap();

        let posts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let messages: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(posts.0, 0);
        // Both directions reference alice, so both rows go
        assert_eq!(messages.0, 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
