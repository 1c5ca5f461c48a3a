//! Graceful shutdown handling
//!
//! Signal handling for `axum::serve(..).with_graceful_shutdown(..)`.

use std::future::Future;
use tokio::signal;
use tracing::{error, info};

/// Create a future that completes when a shutdown signal is received
///
/// This function listens for:
/// - SIGTERM (sent by container orchestrators)
/// - SIGINT (Ctrl+C for local development)
///
/// # Examples
///
/// ```no_run
/// use emotionfad_http::runtime::shutdown_signal;
/// use tokio::net::TcpListener;
/// use axum::Router;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let app = Router::new();
///     let listener = TcpListener::bind("0.0.0.0:5000").await?;
///
///     axum::serve(listener, app)
///         .with_graceful_shutdown(shutdown_signal())
///         .await?;
///
///     Ok(())
/// }
/// ```
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

/// Wait for `signal`, then run `cleanup` before letting the server drain
pub async fn shutdown_with_cleanup<S, F, Fut>(signal: S, cleanup: F)
where
    S: Future<Output = ()>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    signal.await;

    info!("Running shutdown cleanup tasks");
    cleanup().await;
    info!("Cleanup complete, proceeding with shutdown");
}
