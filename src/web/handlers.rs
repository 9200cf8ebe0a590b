//! HTTP handlers for the authentication API.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;
use uuid::Uuid;

use crate::auth::{
    AuthService, RegisterRequest, ResetRequestOutcome, Session, SessionState, SessionStore,
};
use crate::upload::AvatarUpload;
use crate::web::dto::{
    AvatarResponse, ChangeEmailBody, ChangePasswordBody, DeleteAccountBody, ForgotPasswordBody,
    ForgotPasswordResponse, LoginBody, MessageResponse, RegisterBody, ResetPasswordBody,
    SessionResponse, UserResponse,
};
use crate::web::error::{ApiError, ErrorCode};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ripple_session";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service.
    pub auth: AuthService,
    /// Live sessions, keyed by token.
    pub sessions: SessionStore,
    /// Return reset tokens in forgot-password responses (development only).
    pub reveal_reset_token: bool,
}

impl AppState {
    /// Create the shared application state.
    pub fn new(auth: AuthService, reveal_reset_token: bool) -> Self {
        Self {
            auth,
            sessions: SessionStore::new(),
            reveal_reset_token,
        }
    }
}

/// Resolve the session named by the request cookie.
///
/// The cookie is untrusted input; the request is only Authenticated when
/// the store still holds the session it names.
async fn require_session(jar: &CookieJar, state: &AppState) -> Result<Session, ApiError> {
    let auth_state = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state
            .sessions
            .get(cookie.value())
            .await
            .map(SessionState::Authenticated)
            .unwrap_or_default(),
        None => SessionState::Anonymous,
    };

    Ok(auth_state.current()?.clone())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .build()
}

/// POST /api/auth/register - Create an account.
///
/// Does not log the new user in; the client follows up with a login call.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .auth
        .register(RegisterRequest {
            username: body.username,
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            avatar: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login - Verify credentials and establish a session.
///
/// A fresh session token is minted on every login; any token the client
/// held before never becomes authenticated.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let session = state.auth.login(&body.identifier, &body.password).await?;

    // Drop any session the old cookie pointed at
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value()).await;
    }

    let response = SessionResponse::from(&session);
    let token = session.token.clone();
    state.sessions.insert(session).await;

    Ok((jar.add(session_cookie(token)), Json(response)))
}

/// POST /api/auth/logout - End the session. Idempotent.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if state.sessions.remove(cookie.value()).await.is_some() {
            debug!("Session ended");
        }
    }

    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(MessageResponse::new("logged out")),
    )
}

/// GET /api/auth/me - Current session info.
pub async fn me(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = require_session(&jar, &state).await?;
    Ok(Json(SessionResponse::from(&session)))
}

/// POST /api/auth/forgot-password - Request a password reset token.
///
/// The response is the same for known and unknown emails unless the
/// development reveal flag is on.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordBody>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let outcome = state.auth.forgot_password(&body.email).await?;

    let reset_token = match outcome {
        ResetRequestOutcome::TokenIssued(token) if state.reveal_reset_token => Some(token),
        _ => None,
    };

    Ok(Json(ForgotPasswordResponse {
        message: "If that email is registered, a reset link has been sent".to_string(),
        reset_token,
    }))
}

/// POST /api/auth/reset-password - Redeem a reset token.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .reset_password(&body.token, &body.password, &body.confirm_password)
        .await?;

    Ok(Json(MessageResponse::new("password updated")))
}

/// POST /api/account/password - Change password while logged in.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = require_session(&jar, &state).await?;

    state
        .auth
        .change_password(
            session.user_id,
            &body.current_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;

    Ok(Json(MessageResponse::new("password updated")))
}

/// POST /api/account/email - Change email while logged in.
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<ChangeEmailBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = require_session(&jar, &state).await?;

    state
        .auth
        .change_email(session.user_id, &body.email, &body.current_password)
        .await?;

    Ok(Json(MessageResponse::new("email updated")))
}

/// PUT /api/account/avatar - Replace the profile picture (multipart).
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let session = require_session(&jar, &state).await?;

    let upload = spool_avatar_field(&mut multipart).await?;
    let result = state.auth.update_avatar(session.user_id, &upload).await;
    let _ = std::fs::remove_file(&upload.temp_path);
    let profile_picture = result?;

    // Refresh the session snapshot so /me reflects the new picture
    if let Some(user) = state.auth.get_user(session.user_id).await? {
        let mut refreshed = session;
        refreshed.profile_picture = user.profile_picture;
        state.sessions.insert(refreshed).await;
    }

    Ok(Json(AvatarResponse { profile_picture }))
}

/// POST /api/account/delete - Delete the account and end the session.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<DeleteAccountBody>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let session = require_session(&jar, &state).await?;

    state
        .auth
        .delete_account(session.user_id, &body.password, &body.confirm)
        .await?;

    // Every session of the deleted account dies with it
    state.sessions.remove_user(session.user_id).await;

    Ok((
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(MessageResponse::new("account deleted")),
    ))
}

/// Read the avatar field out of a multipart body into a temp file.
async fn spool_avatar_field(multipart: &mut Multipart) -> Result<AvatarUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("could not read upload: {e}")))?;

        let temp_path: PathBuf =
            std::env::temp_dir().join(format!("ripple_upload_{}", Uuid::new_v4().simple()));
        std::fs::write(&temp_path, &bytes).map_err(|e| {
            tracing::error!("Could not spool upload: {e}");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Internal,
                "internal server error",
            )
        })?;

        return Ok(AvatarUpload {
            original_name,
            content_type,
            size: bytes.len() as u64,
            temp_path,
        });
    }

    Err(bad_request("missing avatar field"))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, message)
}
