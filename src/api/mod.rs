//! HTTP API for tasks.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | / | `root` |
//! | GET | /api/todos/all?status=&page= | `list_todos` |
//! | GET | /api/todos/{id} | `get_todo` |
//! | POST | /api/todos/create | `create_todo` |
//! | PUT | /api/todos/update/{id} | `update_todo` |
//! | DELETE | /api/todos/delete/{id} | `delete_todo` |

pub mod dto;
pub mod error;
pub mod handlers;

use crate::service::StoreHandle;
use axum::Router;
use axum::routing::{delete, get, post, put};
use eyre::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Shared handler state. Holds no per-request data.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

/// Build the router with every task route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/todos/all", get(handlers::list_todos))
        .route("/api/todos/create", post(handlers::create_todo))
        .route("/api/todos/update/{id}", put(handlers::update_todo))
        .route("/api/todos/delete/{id}", delete(handlers::delete_todo))
        .route("/api/todos/{id}", get(handlers::get_todo))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local = listener.local_addr().context("Failed to read bound address")?;
    log::info!("Server running on http://{}", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
