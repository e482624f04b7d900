//! HTTP surface
//!
//! The Telegram webhook router is merged with a liveness route for the
//! hosting platform and served on a single port.

use std::future::Future;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;
use crate::utils::errors::Result;

pub const HEALTH_PATH: &str = "/healthz";

/// Router answering the platform health check
pub fn health_router() -> Router {
    Router::new().route(HEALTH_PATH, get(health_handler))
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(address) = listener.local_addr() {
        info!(address = %address, health = HEALTH_PATH, "HTTP server listening");
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
