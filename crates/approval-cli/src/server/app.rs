//! Axum application setup.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Batch
        .route("/batch", get(handlers::get_batch).post(handlers::new_batch))
        .route("/batch/export", post(handlers::export_batch))
        .route("/batch/score", post(handlers::score_batch))
        // Queue
        .route("/queue/current", get(handlers::get_current))
        .route("/queue/decide", post(handlers::decide))
        .route("/queue/summary", get(handlers::get_summary))
        .route("/queue/results", get(handlers::get_results))
        .route("/queue/finalize", post(handlers::finalize));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Start the web server, stopping cleanly on Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "review server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;

    Ok(())
}
