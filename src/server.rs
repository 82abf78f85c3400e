/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{GatewayError, GatewayResult},
};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": ctx.config.service.version
    }))
}

/// 404 handler; HKP clients expect plain-text error bodies
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> GatewayResult<()> {
    let addr = format!("{}:{}", ctx.config.service.host, ctx.config.service.port);

    info!("keyserver gateway listening on {}", addr);
    info!("directory: https://{}/api/v4", ctx.config.gitlab.host);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| GatewayError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
