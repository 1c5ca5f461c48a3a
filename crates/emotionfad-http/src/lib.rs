//! # EmotionFAD HTTP Runtime
//!
//! Axum server exposing the fraud detection system over REST and a JSON
//! WebSocket channel.
//!
//! ## Features
//!
//! - **REST** analysis routes for images, text and combined reports
//! - **WebSocket** (`websocket`): live video frame and chat analysis
//! - **OpenAPI** (`openapi`): machine-readable API description

pub mod runtime;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-export main types for public API
pub use runtime::*;
