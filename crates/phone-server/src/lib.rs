pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Camera frames arrive base64-encoded inside JSON.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index))
        // Phone
        .route("/api/phone/status", get(routes::phone::status))
        .route("/api/phone/connect", post(routes::phone::connect))
        .route("/api/phone/disconnect", post(routes::phone::disconnect))
        .route("/api/phone/call", post(routes::phone::call))
        .route("/api/phone/message", post(routes::phone::open_message))
        .route("/api/phone/send-message", post(routes::phone::send_message))
        // Voice
        .route("/api/voice/status", get(routes::voice::status))
        // Diagnostics
        .route("/api/debug/adb-devices", get(routes::debug::adb_devices))
        // Detection
        .route("/detect", post(routes::detect::detect))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Serve on a pre-bound listener until Ctrl-C.
pub async fn serve_on(listener: tokio::net::TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(app_state);

    tracing::info!("phone server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Bind `host:port` and serve.
pub async fn serve(host: &str, port: u16, app_state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(listener, app_state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
