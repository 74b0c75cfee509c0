//! API module providing HTTP endpoints for Blood-Connect.
//!
//! This module is organized into submodules:
//! - `alerts` - Emergency alert endpoints (/api/alerts/*)
//! - `donors` - Donor directory endpoints (/api/donors/*)
//! - `events` - Server-sent events stream (/api/events)
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod alerts;
pub mod donors;
pub mod events;
pub mod health;
pub mod openapi;

// Re-export commonly used items
pub use alerts::ALERTS_TAG;
pub use donors::DONORS_TAG;
pub use health::MISC_TAG;

use crate::AppResources;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/alerts", alerts::router())
        .nest("/api/donors", donors::router())
        .routes(routes!(events::events))
        .routes(routes!(health::health))
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    let router = router.merge(Redoc::with_url("/api-docs", api));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!(
        name = "api.start_webserver",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        addr = "0.0.0.0:8080",
        message = "Server running"
    );
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
