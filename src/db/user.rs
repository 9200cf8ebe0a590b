//! User model for ripple.

/// Profile picture reference used when no upload was accepted.
pub const DEFAULT_AVATAR: &str = "default_avatar.png";

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique).
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Password hash (Argon2 PHC string).
    pub password: String,
    /// Profile picture file reference.
    pub profile_picture: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash (must be pre-hashed).
    pub password: String,
    /// Profile picture file reference.
    pub profile_picture: String,
}

impl NewUser {
    /// Create a new user record with the default profile picture.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            profile_picture: DEFAULT_AVATAR.to_string(),
        }
    }

    /// Set the profile picture reference.
    pub fn with_profile_picture(mut self, picture: impl Into<String>) -> Self {
        self.profile_picture = picture.into();
        self
    }
}
