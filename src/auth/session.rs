//! Session state and the in-process session store.
//!
//! A session is a snapshot of the user taken at login. Every login mints a
//! fresh session token, so a token handed out before authentication can
//! never name an authenticated session (session fixation prevention).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::User;
use crate::{Result, RippleError};

/// An authenticated session snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session token, minted at login.
    pub token: String,
    /// ID of the authenticated user.
    pub user_id: i64,
    /// Username at login time.
    pub username: String,
    /// Profile picture reference at login time.
    pub profile_picture: String,
    /// When the session was established.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Establish a session for a user, minting a fresh token.
    pub fn establish(user: &User) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Per-client authentication state.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No authenticated user.
    #[default]
    Anonymous,
    /// An authenticated session.
    Authenticated(Session),
}

impl SessionState {
    /// Transition to authenticated, replacing any existing session.
    ///
    /// The old session token (if any) is discarded, never reused.
    pub fn login(&mut self, user: &User) -> &Session {
        *self = SessionState::Authenticated(Session::establish(user));
        match self {
            SessionState::Authenticated(session) => session,
            SessionState::Anonymous => unreachable!(),
        }
    }

    /// Transition to anonymous, returning the session that was ended.
    ///
    /// Idempotent: logging out while anonymous returns `None`.
    pub fn logout(&mut self) -> Option<Session> {
        match std::mem::take(self) {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }

    /// Get the current session, or fail if anonymous.
    pub fn current(&self) -> Result<&Session> {
        match self {
            SessionState::Authenticated(session) => Ok(session),
            SessionState::Anonymous => Err(RippleError::Unauthenticated),
        }
    }

    /// Whether a user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Shared in-process session store, keyed by session token.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its token.
    pub async fn insert(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
    }

    /// Look up a session by token.
    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Remove a session by token, returning it if present.
    pub async fn remove(&self, token: &str) -> Option<Session> {
        self.sessions.write().await.remove(token)
    }

    /// Remove every session belonging to a user.
    ///
    /// Used when an account is deleted so no live session outlives it.
    pub async fn remove_user(&self, user_id: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store has no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
