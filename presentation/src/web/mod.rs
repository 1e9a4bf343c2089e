//! Web chat surface
//!
//! | route            | purpose                                  |
//! |------------------|------------------------------------------|
//! | `GET /`          | chat page                                |
//! | `GET /api/models`| model choices and the preselected model  |
//! | `POST /api/chat` | stream one answer as server-sent events  |
//! | `GET /health`    | liveness probe                           |

pub mod events;
pub mod handlers;
pub mod page;
pub mod state;

pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/models", get(handlers::models))
        .route("/api/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` is cancelled.
///
/// In-flight responses are allowed to finish before this returns.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
