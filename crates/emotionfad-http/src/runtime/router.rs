//! HTTP router configuration
//!
//! This module provides router setup and route registration for the HTTP runtime.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::runtime::{
    AppState,
    error::request_id_middleware,
    handlers::{
        analyze_comprehensive, analyze_facial, analyze_frame, analyze_text, health_check,
        readiness_check,
    },
    rate_limit::{RateLimitState, rate_limit_middleware},
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // Analysis routes - rate limited
    let mut analysis_routes = Router::new()
        .route("/analyze/facial", post(analyze_facial))
        .route("/analyze/text", post(analyze_text))
        .route("/analyze/comprehensive", post(analyze_comprehensive))
        .route("/api/analyze", post(analyze_frame));

    match RateLimitState::try_new(config.rate_limit.clone()) {
        Some(limits) => {
            analysis_routes = analysis_routes.route_layer(middleware::from_fn_with_state(
                Arc::new(limits),
                rate_limit_middleware,
            ));
        }
        None => warn!(
            rate_limit = ?config.rate_limit,
            "Rate limiting disabled: quotas must be greater than 0"
        ),
    }

    // Public routes - not rate limited
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check));

    let router = Router::new().merge(public_routes).merge(analysis_routes);

    #[cfg(feature = "websocket")]
    let router = router.route("/ws", get(crate::websocket::websocket_handler));

    let mut router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(timeout_layer(config.request_timeout()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    // Add OpenAPI documentation if enabled
    #[cfg(feature = "openapi")]
    if config.enable_openapi {
        router = router.merge(create_openapi_router());
    }

    router
}

/// Requests running past `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Create OpenAPI documentation router
#[cfg(feature = "openapi")]
fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(crate::runtime::docs::openapi_spec),
    )
}
