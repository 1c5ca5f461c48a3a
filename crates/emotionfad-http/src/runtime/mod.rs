//! # Runtime Module
//!
//! The HTTP side of EmotionFAD: configuration, shared state, REST handlers,
//! middleware and the router that ties them together.
//!
//! ## Usage Pattern
//!
//! ```no_run
//! use emotionfad_http::runtime::{AppState, ServerConfigBuilder, create_router, shutdown_signal};
//! use std::net::SocketAddr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfigBuilder::from_env()?.build()?;
//!     let address = config.bind_address();
//!     let state = AppState::from_config(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind(address).await?;
//!     axum::serve(
//!         listener,
//!         create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .with_graceful_shutdown(shutdown_signal())
//!     .await?;
//!     Ok(())
//! }
//! ```

/// Environment-based server configuration.
pub mod config;
/// OpenAPI document.
#[cfg(feature = "openapi")]
pub mod docs;
/// Error envelope, request IDs and the JSON extractor.
pub mod error;
/// REST endpoint handlers.
pub mod handlers;
/// Global and per-IP rate limiting.
pub mod rate_limit;
/// Router assembly.
pub mod router;
/// Graceful shutdown.
pub mod shutdown;
/// Shared application state.
pub mod state;

pub use config::{
    ConfigError, DetectorSettings, ServerConfig, ServerConfigBuilder, WebSocketConfig,
};
pub use error::{
    ApiError, ApiJson, ApiResult, ErrorResponse, REQUEST_ID_HEADER, RequestId,
    request_id_middleware,
};
pub use rate_limit::{LimitScope, RateLimitConfig, RateLimitState, rate_limit_middleware};
pub use router::create_router;
pub use shutdown::{shutdown_signal, shutdown_with_cleanup};
pub use state::AppState;
