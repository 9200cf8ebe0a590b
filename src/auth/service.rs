//! Authentication service: the sanctioned entry point for every
//! credential and token mutation.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::auth::password::{equalizing_hash, hash_password, verify_password};
use crate::auth::session::Session;
use crate::auth::token::generate_reset_token;
use crate::auth::validation::{check_email, validate_new_password, validate_registration};
use crate::config::AuthConfig;
use crate::db::{
    NewUser, PasswordResetRepository, User, UserRepository, DEFAULT_AVATAR, TIMESTAMP_FORMAT,
};
use crate::upload::{AvatarStore, AvatarUpload};
use crate::{Result, RippleError};

/// Single failure message for every login denial. Unknown identifier and
/// wrong password must be byte-identical so neither path confirms that an
/// account exists.
pub const LOGIN_FAILED: &str = "wrong username/password combination";

const CURRENT_PASSWORD_WRONG: &str = "Current password is incorrect";
const DELETE_PHRASE: &str = "delete";

/// A registration submission.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Optional profile picture; the default avatar is used when absent.
    pub avatar: Option<AvatarUpload>,
}

/// Outcome of a forgot-password request.
///
/// Unknown emails are acknowledged without a token so the endpoint can't be
/// used to probe which addresses are registered.
#[derive(Debug, Clone)]
pub enum ResetRequestOutcome {
    /// Request accepted; no token was issued.
    Acknowledged,
    /// A token was issued for a known account.
    TokenIssued(String),
}

/// Authentication and account-lifecycle service.
#[derive(Debug, Clone)]
pub struct AuthService {
    pool: SqlitePool,
    config: AuthConfig,
    avatars: AvatarStore,
}

impl AuthService {
    /// Create a service over a database pool.
    pub fn new(pool: SqlitePool, config: AuthConfig, avatars: AvatarStore) -> Self {
        Self {
            pool,
            config,
            avatars,
        }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    fn resets(&self) -> PasswordResetRepository<'_> {
        PasswordResetRepository::new(&self.pool)
    }

    /// Register a new account.
    ///
    /// Collects every validation violation before reporting, checks both
    /// uniqueness conflicts independently, and does not establish a session.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let mut violations = Vec::new();
        if let Err(RippleError::Validation(v)) = validate_registration(
            &request.username,
            &request.email,
            &request.password,
            &request.confirm_password,
        ) {
            violations.extend(v);
        }
        if let Some(avatar) = &request.avatar {
            if let Err(e) = avatar.validate() {
                violations.push(e.to_string());
            }
        }
        if !violations.is_empty() {
            return Err(RippleError::Validation(violations));
        }

        let users = self.users();
        let mut conflicts = Vec::new();
        if users.username_exists(&request.username).await? {
            conflicts.push("username already exists");
        }
        if users.email_in_use(&request.email, None).await? {
            conflicts.push("email already exists");
        }
        if !conflicts.is_empty() {
            return Err(RippleError::Conflict(conflicts.join("; ")));
        }

        let password_hash = hash_password(&request.password)?;

        let mut new_user = NewUser::new(&request.username, &request.email, password_hash);
        if let Some(avatar) = &request.avatar {
            new_user = new_user.with_profile_picture(self.avatars.store(avatar)?);
        }

        // The pre-checks above produce the friendly error; a race that slips
        // past them still resolves to Conflict via the UNIQUE constraints.
        let user = users.create(&new_user).await?;
        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials and establish a session.
    ///
    /// The identifier matches either username or email. Every failure is the
    /// same `Authentication` error, and an unknown identifier still pays for
    /// one hash verification so the two failure paths take comparable time.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session> {
        let user = self.users().get_by_identifier(identifier).await?;

        let user = match user {
            Some(user) => user,
            None => {
                let _ = verify_password(password, equalizing_hash());
                debug!("Login failed: unknown identifier");
                return Err(RippleError::Authentication(LOGIN_FAILED.to_string()));
            }
        };

        if verify_password(password, &user.password).is_err() {
            debug!("Login failed for user id {}", user.id);
            return Err(RippleError::Authentication(LOGIN_FAILED.to_string()));
        }

        info!("User {} (id {}) logged in", user.username, user.id);
        Ok(Session::establish(&user))
    }

    /// Handle a forgot-password request.
    ///
    /// A known email gets a fresh token that replaces any earlier one; an
    /// unknown email is acknowledged without issuing anything.
    pub async fn forgot_password(&self, email: &str) -> Result<ResetRequestOutcome> {
        if let Some(issue) = check_email(email) {
            return Err(RippleError::Validation(vec![issue.to_string()]));
        }

        let user = match self.users().get_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!("Reset requested for unknown email");
                return Ok(ResetRequestOutcome::Acknowledged);
            }
        };

        let token = generate_reset_token();
        let expires_at = (Utc::now() + Duration::minutes(self.config.reset_token_ttl_mins))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        self.resets()
            .replace_for_email(&user.email, &token, &expires_at)
            .await?;

        info!("Issued password reset token for user id {}", user.id);
        Ok(ResetRequestOutcome::TokenIssued(token))
    }

    /// Redeem a reset token and set a new password.
    ///
    /// The token must exist, be unexpired, and survive single-use
    /// consumption; an expired token is deleted on sight.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let resets = self.resets();

        let reset = resets
            .get_by_token(token)
            .await?
            .ok_or_else(|| RippleError::NotFound("reset token".to_string()))?;

        if reset.is_expired() {
            resets.delete_by_token(token).await?;
            debug!("Rejected expired reset token for {}", reset.email);
            return Err(RippleError::Expired("reset token".to_string()));
        }

        validate_new_password(new_password, confirm_password)?;

        let password_hash = hash_password(new_password)?;

        // Consumption is the commit point: of two concurrent submissions of
        // the same token, exactly one gets the email back.
        let email = resets
            .consume(token)
            .await?
            .ok_or_else(|| RippleError::NotFound("reset token".to_string()))?;

        if !self
            .users()
            .update_password_by_email(&email, &password_hash)
            .await?
        {
            warn!("Reset token consumed but account no longer exists");
            return Err(RippleError::NotFound("user".to_string()));
        }

        info!("Password reset completed for account");
        Ok(())
    }

    /// Change the password of a logged-in user.
    ///
    /// Existing sessions stay valid.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let user = self.require_user(user_id).await?;

        if verify_password(current_password, &user.password).is_err() {
            return Err(RippleError::Authentication(
                CURRENT_PASSWORD_WRONG.to_string(),
            ));
        }

        validate_new_password(new_password, confirm_password)?;

        let password_hash = hash_password(new_password)?;
        self.users().update_password(user_id, &password_hash).await?;

        info!("User id {} changed password", user_id);
        Ok(())
    }

    /// Change the email address of a logged-in user.
    pub async fn change_email(
        &self,
        user_id: i64,
        new_email: &str,
        current_password: &str,
    ) -> Result<()> {
        let user = self.require_user(user_id).await?;

        if verify_password(current_password, &user.password).is_err() {
            return Err(RippleError::Authentication(
                CURRENT_PASSWORD_WRONG.to_string(),
            ));
        }

        if let Some(issue) = check_email(new_email) {
            return Err(RippleError::Validation(vec![issue.to_string()]));
        }

        let users = self.users();
        if users.email_in_use(new_email, Some(user_id)).await? {
            return Err(RippleError::Conflict("email already exists".to_string()));
        }

        users.update_email(user_id, new_email).await?;
        info!("User id {} changed email", user_id);
        Ok(())
    }

    /// Replace the profile picture of a logged-in user.
    ///
    /// Returns the stored filename. The previous picture file is removed
    /// unless it is the shared default.
    pub async fn update_avatar(&self, user_id: i64, upload: &AvatarUpload) -> Result<String> {
        let user = self.require_user(user_id).await?;

        let filename = self.avatars.store(upload)?;
        self.users()
            .update_profile_picture(user_id, &filename)
            .await?;

        if user.profile_picture != DEFAULT_AVATAR {
            if let Err(e) = self.avatars.remove(&user.profile_picture) {
                warn!("Could not remove previous avatar: {e}");
            }
        }

        info!("User id {} updated profile picture", user_id);
        Ok(filename)
    }

    /// Delete an account and everything that belongs to it.
    ///
    /// Requires the current password and the literal confirmation phrase
    /// "DELETE" (case-insensitive, surrounding whitespace ignored).
    pub async fn delete_account(
        &self,
        user_id: i64,
        current_password: &str,
        confirm_phrase: &str,
    ) -> Result<()> {
        let user = self.require_user(user_id).await?;

        if verify_password(current_password, &user.password).is_err() {
            return Err(RippleError::Authentication(
                CURRENT_PASSWORD_WRONG.to_string(),
            ));
        }

        if !confirm_phrase.trim().eq_ignore_ascii_case(DELETE_PHRASE) {
            return Err(RippleError::Validation(vec![
                "Please type DELETE to confirm".to_string(),
            ]));
        }

        // Posts and messages cascade at the schema level.
        self.users().delete(user_id).await?;

        if user.profile_picture != DEFAULT_AVATAR {
            if let Err(e) = self.avatars.remove(&user.profile_picture) {
                warn!("Could not remove avatar of deleted account: {e}");
            }
        }

        info!("Deleted account {} (id {})", user.username, user_id);
        Ok(())
    }

    /// Fetch a user for an authenticated operation.
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.users().get_by_id(user_id).await
    }

    /// Remove expired reset tokens. Housekeeping only; expiry is already
    /// enforced at redemption time.
    pub async fn cleanup_expired_tokens(&self) -> Result<u64> {
        self.resets().cleanup_expired().await
    }

    async fn require_user(&self, user_id: i64) -> Result<User> {
        self.users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| RippleError::NotFound("user".to_string()))
    }
}
