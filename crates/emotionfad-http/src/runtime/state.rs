//! Shared application state handed to every handler

use crate::runtime::config::ServerConfig;
#[cfg(feature = "websocket")]
use crate::websocket::ClientRegistry;
use emotionfad_core::{
    AnalysisResult, EmotionDetector, FraudDetectionSystem, HttpEmotionDetector,
    UnavailableDetector,
};
use std::{sync::Arc, time::Instant};
use tracing::{info, warn};

/// State shared by the REST and WebSocket handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub system: Arc<FraudDetectionSystem>,
    #[cfg(feature = "websocket")]
    pub clients: Arc<ClientRegistry>,
    pub config: Arc<ServerConfig>,
    started_at: Instant,
}

impl AppState {
    /// Wrap an existing analysis system
    pub fn new(system: FraudDetectionSystem, config: ServerConfig) -> Self {
        Self {
            system: Arc::new(system),
            #[cfg(feature = "websocket")]
            clients: Arc::new(ClientRegistry::new(config.websocket.max_connections)),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Build the analysis system described by `config`.
    ///
    /// Without a detector URL the service starts with an unavailable
    /// detector: text analysis works and facial analysis reports
    /// "Emotion analyzer not initialized".
    ///
    /// # Errors
    ///
    /// Fails when the detector client cannot be created from the URL.
    pub fn from_config(config: ServerConfig) -> AnalysisResult<Self> {
        let detector: Arc<dyn EmotionDetector> = match config.detector_config() {
            Some(detector_config) => {
                let detector = HttpEmotionDetector::new(detector_config)?;
                info!(endpoint = %detector.endpoint(), "Using remote emotion detector");
                Arc::new(detector)
            }
            None => {
                warn!("No detector URL configured, facial analysis is disabled");
                Arc::new(UnavailableDetector)
            }
        };

        let system = FraudDetectionSystem::new(detector).with_config(config.analyzer_config());
        Ok(Self::new(system, config))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Open WebSocket sessions; always 0 without the `websocket` feature
    pub fn connected_clients(&self) -> usize {
        #[cfg(feature = "websocket")]
        {
            self.clients.len()
        }
        #[cfg(not(feature = "websocket"))]
        {
            0
        }
    }
}
