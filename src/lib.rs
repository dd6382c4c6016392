// Library exports for testing and external use

pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    BoxError, Router,
};
use std::{sync::Arc, time::Duration};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use models::errors::AppError;
use services::{documents::DocumentStore, objects::ObjectStore};
use utils::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub documents: Arc<dyn DocumentStore>,
    /// Converted DOCX reports.
    pub reports: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        documents: impl DocumentStore + 'static,
        reports: impl DocumentStore + 'static,
        objects: impl ObjectStore + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            documents: Arc::new(documents),
            reports: Arc::new(reports),
            objects: Arc::new(objects),
        }
    }
}

/// Build the API router without the outer middleware stack.
pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_file_size;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/store-json", post(handlers::documents::store_json))
        .route("/api/upload-image", post(handlers::upload::upload_image))
        .route("/api/reports/upload", post(handlers::reports::upload_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}

/// The router with tracing, the request timeout and CORS applied.
pub fn create_app(app_state: AppState) -> Router {
    let timeout_seconds = app_state.config.request_timeout_seconds;

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                middleware_error(err, timeout_seconds)
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(timeout_seconds)))
            .layer(cors_layer()),
    )
}

/// Render errors raised by the middleware stack as JSON error bodies.
pub fn middleware_error(err: BoxError, timeout_seconds: u64) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request exceeded the {}s timeout", timeout_seconds);
        AppError::timeout(timeout_seconds)
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        AppError::internal_error(format!("Unhandled internal error: {}", err))
    }
}

/// Cross-origin requests are accepted from any origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_middleware_error_maps_elapsed_to_timeout() {
        let err = middleware_error(Box::new(tower::timeout::error::Elapsed::new()), 30);
        assert_eq!(err.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            err.to_string(),
            "Processing timeout: operation took longer than 30 seconds"
        );
    }

    #[test]
    fn test_middleware_error_falls_back_to_internal_error() {
        let err = middleware_error("connection reset".into(), 30);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Unhandled internal error: connection reset");
    }
}
