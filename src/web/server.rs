//! HTTP server bootstrap.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::AuthService;
use crate::config::Config;
use crate::upload::AvatarStore;
use crate::web::handlers::AppState;
use crate::web::router::create_router;
use crate::{Database, Result, RippleError};

/// Web server for the authentication API.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl WebServer {
    /// Wire the application state from configuration.
    pub fn new(config: &Config, db: &Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| RippleError::Config(format!("invalid server address: {e}")))?;

        let avatars = AvatarStore::new(&config.uploads.path)?;
        let auth = AuthService::new(db.pool().clone(), config.auth.clone(), avatars);
        let state = Arc::new(AppState::new(auth, config.auth.reveal_reset_token));

        Ok(Self { addr, state })
    }

    /// Shared application state, exposed for tests.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Bind and serve until the task is cancelled.
    pub async fn serve(self) -> Result<()> {
        let router = create_router(self.state);
        let listener = TcpListener::bind(self.addr).await?;
        info!("Listening on {}", self.addr);

        axum::serve(listener, router).await?;
        Ok(())
    }
}
