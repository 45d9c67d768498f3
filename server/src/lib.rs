//! HTTP backend for a todo list.
//!
//! # Routes
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/todos` | [`handlers::list_todos`] |
//! | POST | `/todos` | [`handlers::create_todo`] |
//! | DELETE | `/todos` | [`handlers::delete_all_todos`] |
//! | GET | `/todos/{id}` | [`handlers::get_todo`] |
//! | PUT, PATCH | `/todos/{id}` | [`handlers::update_todo`] |
//! | DELETE | `/todos/{id}` | [`handlers::delete_todo`] |
//!
//! Paths have no trailing-slash variants.
//!
//! # Design
//! Handlers hold no state of their own. Everything goes through the
//! [`TodoStore`] in [`AppState`], which is either [`MemoryStore`] or
//! [`SqliteStore`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod links;
pub mod model;
pub mod representation;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderMap,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use representation::TodoRepresentation;
pub use store::{MemoryStore, SqliteStore, StoreError, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    public_url: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            public_url: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Use a fixed base for item URLs instead of deriving one per request.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = Some(public_url.into());
        self
    }

    pub(crate) fn base_url(&self, headers: &HeaderMap) -> String {
        match &self.public_url {
            Some(url) => url.clone(),
            None => links::request_base_url(headers),
        }
    }
}

/// Pick the store named by `config`: SQLite when `DATABASE_URL` is set,
/// memory otherwise.
pub async fn state_from_config(config: &ServerConfig) -> Result<AppState, StoreError> {
    let store: Arc<dyn TodoStore> = match &config.database_url {
        Some(url) => {
            tracing::info!(%url, "using sqlite store");
            Arc::new(SqliteStore::connect(url).await?)
        }
        None => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let state = AppState::new(store);
    Ok(match &config.public_url {
        Some(url) => state.with_public_url(url.clone()),
        None => state,
    })
}

/// An app backed by a fresh in-memory store.
pub fn app() -> Router {
    router(AppState::in_memory())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .delete(handlers::delete_all_todos),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

/// Serve a fresh in-memory app on `listener`.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::in_memory()).await
}
