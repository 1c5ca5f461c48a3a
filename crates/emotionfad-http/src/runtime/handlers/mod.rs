//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers organized by functionality.

pub mod analysis;
pub mod health;

// Re-export handlers for convenience
pub use analysis::*;
pub use health::*;
