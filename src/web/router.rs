//! Router configuration for the HTTP API.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{
    change_email, change_password, delete_account, forgot_password, login, logout, me, register,
    reset_password, update_avatar, AppState,
};
use crate::upload::MAX_AVATAR_SIZE;

/// Request body cap for avatar uploads. Leaves headroom above the avatar
/// size limit for multipart framing, so the 5 MiB check in validation is
/// the one that decides.
const AVATAR_BODY_LIMIT: usize = MAX_AVATAR_SIZE as usize + 1024 * 1024;

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password));

    let account_routes = Router::new()
        .route("/password", post(change_password))
        .route("/email", post(change_email))
        .route(
            "/avatar",
            put(update_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
        )
        .route("/delete", post(delete_account));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/account", account_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
