//! HTTP service for an ordered todo list backed by SQLite.
//!
//! `app` assembles the router for an already-open `TodoStore`; `run` opens
//! the store from a `Config` and serves until Ctrl-C.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod store;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::Config;
pub use error::AppError;
pub use store::{StoreError, TodoStore};

pub fn app(store: TodoStore, prefix: &str) -> Router {
    routes::router(store, prefix)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
}

pub async fn run(listener: TcpListener, config: &Config) -> anyhow::Result<()> {
    let store = TodoStore::connect(&config.database_url, config.max_connections).await?;
    axum::serve(listener, app(store, &config.api_prefix))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
