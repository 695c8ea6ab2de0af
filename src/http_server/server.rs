//! # HTTP Server
//!
//! Opens the event store, builds the API router and serves it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::{api_routes, AppState};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::store::{EventStore, SqliteStore, StoreError};

use super::config::HttpServerConfig;

/// Failures while starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to open event store: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid socket address '{0}'")]
    InvalidAddress(String),

    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the analytics API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Open the store named by `config.database_path` and build the server
    pub fn open(config: HttpServerConfig) -> Result<Self, ServerError> {
        let store = SqliteStore::open_location(&config.database_path)?;
        log_event_with_fields(
            Event::StoreOpened,
            &[("database", config.database_path.as_str())],
        );
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build the server over an already opened store
    pub fn with_store(config: HttpServerConfig, store: Arc<dyn EventStore>) -> Self {
        let clear_key = config.clear_key();
        if clear_key.is_insecure_default() {
            log_event_with_fields(
                Event::InsecureClearKey,
                &[("hint", "set CLEAR_KEY or clear_key before exposing this server")],
            );
        }

        let router = api_routes(Arc::new(AppState::new(store, clear_key)));
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .socket_addr()
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.socket_addr()))?;

        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, ctrl_c()).await
    }

    /// Serve on an already bound listener until `signal` resolves
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?.to_string();
        log_event_with_fields(Event::Serving, &[("addr", local.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

async fn ctrl_c() {
    // Without a signal handler the server simply runs until killed.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}
