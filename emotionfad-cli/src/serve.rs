//! `emotionfad serve`

use clap::Args;
use emotionfad_http::{
    AppState, ServerConfigBuilder, create_router, shutdown_signal, shutdown_with_cleanup,
};
use std::net::SocketAddr;
use tracing::info;

use crate::CliError;

/// Flags for `serve`; each one overrides its environment variable
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Base URL of the emotion model server
    #[arg(long)]
    pub detector_url: Option<String>,
    /// Fraud risk above which text is suspicious
    #[arg(long)]
    pub fraud_threshold: Option<f64>,
    /// Disable permissive CORS
    #[arg(long)]
    pub no_cors: bool,
}

impl ServeArgs {
    fn apply(self, mut builder: ServerConfigBuilder) -> ServerConfigBuilder {
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(url) = self.detector_url {
            builder = builder.detector_url(url);
        }
        if let Some(threshold) = self.fraud_threshold {
            builder = builder.fraud_threshold(threshold);
        }
        if self.no_cors {
            builder = builder.enable_cors(false);
        }
        builder
    }
}

pub async fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let config = args.apply(ServerConfigBuilder::from_env()?).build()?;
    let address = config.bind_address();
    let state = AppState::from_config(config)?;
    let drain_state = state.clone();

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        address = %address,
        analyzer_ready = state.system.detector_ready(),
        detector = state.system.detector_name(),
        "EmotionFAD server listening"
    );

    axum::serve(
        listener,
        create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_with_cleanup(shutdown_signal(), || async move {
        info!(
            connected_clients = drain_state.connected_clients(),
            "Draining connections"
        );
    }))
    .await?;

    info!("Server stopped");
    Ok(())
}
