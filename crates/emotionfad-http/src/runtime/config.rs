//! # Environment-Based Configuration
//!
//! Server settings with defaults, a fluent builder and environment variable
//! loading. Command-line flags are applied on top of the environment by the
//! CLI through the same builder.
//!
//! ## Environment Variables
//!
//! ### Server
//! - `EMOTIONFAD_HOST` - Bind address (default: 0.0.0.0)
//! - `EMOTIONFAD_PORT` - Bind port (default: 5000)
//! - `EMOTIONFAD_REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `EMOTIONFAD_MAX_BODY_SIZE` - Maximum request body size in bytes (default: 16777216 / 16MB)
//! - `EMOTIONFAD_ENABLE_CORS` - Enable CORS (default: true)
//! - `EMOTIONFAD_ENABLE_OPENAPI` - Enable OpenAPI docs (default: true)
//!
//! ### Analysis
//! - `EMOTIONFAD_FRAUD_THRESHOLD` - Text fraud risk above which text is suspicious (default: 0.6)
//! - `EMOTIONFAD_DETECTOR_URL` - Base URL of the emotion model server (unset: no detector)
//! - `EMOTIONFAD_DETECTOR_TIMEOUT_SECS` - Model server timeout in seconds (default: 20)
//! - `EMOTIONFAD_DETECTOR_BACKEND` - Face detector backend forwarded to the model server
//! - `EMOTIONFAD_ANNOTATE_FRAMES` - Return `frame_with_boxes` on frame analyses (default: true)
//!
//! ### Rate Limiting
//! - `EMOTIONFAD_RATE_LIMIT_GLOBAL_RPM` - Global requests per minute (default: 1000)
//! - `EMOTIONFAD_RATE_LIMIT_PER_IP_RPM` - Per-IP requests per minute (default: 120)
//!
//! ### WebSocket
//! - `EMOTIONFAD_WS_MAX_CONNECTIONS` - Concurrent WebSocket clients (default: 1000)
//! - `EMOTIONFAD_WS_MAX_MESSAGE_SIZE` - Largest WebSocket message in bytes (default: 16MB)

use crate::runtime::rate_limit::RateLimitConfig;
use emotionfad_core::analyzer::DEFAULT_FRAUD_THRESHOLD;
use emotionfad_core::{AnalyzerConfig, DetectorConfig};
use std::{env, time::Duration};

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_BODY_SIZE_LIMIT: usize = 100 * 1024 * 1024;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// WebSocket limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSocketConfig {
    /// Maximum concurrently connected clients
    pub max_connections: usize,
    /// Largest accepted message in bytes
    pub max_message_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

/// Remote emotion model settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Base URL of the model server; `None` runs without a detector
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub backend: Option<String>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 20,
            backend: None,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_size: usize,
    pub enable_cors: bool,
    pub enable_openapi: bool,
    pub fraud_threshold: f64,
    pub annotate_frames: bool,
    pub detector: DetectorSettings,
    pub rate_limit: RateLimitConfig,
    pub websocket: WebSocketConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            max_body_size: 16 * 1024 * 1024, // 16MB
            enable_cors: true,
            enable_openapi: true,
            fraud_threshold: DEFAULT_FRAUD_THRESHOLD,
            annotate_frames: true,
            detector: DetectorSettings::default(),
            rate_limit: RateLimitConfig::default(),
            websocket: WebSocketConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Detector client settings, when a model server is configured
    pub fn detector_config(&self) -> Option<DetectorConfig> {
        let url = self.detector.url.as_ref()?;
        let mut config = DetectorConfig::new(url.clone())
            .with_timeout(Duration::from_secs(self.detector.timeout_secs));
        if let Some(backend) = &self.detector.backend {
            config = config.with_backend(backend.clone());
        }
        Some(config)
    }

    /// Analyzer settings; a decoded frame can never exceed the body limit
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            fraud_threshold: self.fraud_threshold,
            max_frame_bytes: self.max_body_size,
            annotate_frames: self.annotate_frames,
        }
    }
}

/// Builder for `ServerConfig` with environment variable support
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        // Server
        if let Some(host) = get_env_string("EMOTIONFAD_HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = get_env_u16("EMOTIONFAD_PORT")? {
            builder = builder.port(port);
        }
        if let Some(timeout) = get_env_u64("EMOTIONFAD_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(max_size) = get_env_usize("EMOTIONFAD_MAX_BODY_SIZE")? {
            builder = builder.max_body_size(max_size);
        }
        if let Some(cors) = get_env_bool("EMOTIONFAD_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }
        if let Some(openapi) = get_env_bool("EMOTIONFAD_ENABLE_OPENAPI")? {
            builder = builder.enable_openapi(openapi);
        }

        // Analysis
        if let Some(threshold) = get_env_f64("EMOTIONFAD_FRAUD_THRESHOLD")? {
            builder = builder.fraud_threshold(threshold);
        }
        if let Some(annotate) = get_env_bool("EMOTIONFAD_ANNOTATE_FRAMES")? {
            builder = builder.annotate_frames(annotate);
        }
        if let Some(url) = get_env_string("EMOTIONFAD_DETECTOR_URL") {
            builder = builder.detector_url(url);
        }
        if let Some(timeout) = get_env_u64("EMOTIONFAD_DETECTOR_TIMEOUT_SECS")? {
            builder = builder.detector_timeout_secs(timeout);
        }
        if let Some(backend) = get_env_string("EMOTIONFAD_DETECTOR_BACKEND") {
            builder = builder.detector_backend(backend);
        }

        // Rate Limiting
        let mut rate_limit = RateLimitConfig::default();
        if let Some(rpm) = get_env_u32("EMOTIONFAD_RATE_LIMIT_GLOBAL_RPM")? {
            rate_limit.global_rpm = rpm;
        }
        if let Some(rpm) = get_env_u32("EMOTIONFAD_RATE_LIMIT_PER_IP_RPM")? {
            rate_limit.per_ip_rpm = rpm;
        }
        builder = builder.rate_limit(rate_limit);

        // WebSocket
        let mut websocket = WebSocketConfig::default();
        if let Some(max) = get_env_usize("EMOTIONFAD_WS_MAX_CONNECTIONS")? {
            websocket.max_connections = max;
        }
        if let Some(size) = get_env_usize("EMOTIONFAD_WS_MAX_MESSAGE_SIZE")? {
            websocket.max_message_size = size;
        }
        builder = builder.websocket(websocket);

        Ok(builder)
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set request timeout in seconds
    #[must_use]
    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.config.request_timeout_secs = timeout;
        self
    }

    /// Set maximum request body size in bytes
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Enable or disable CORS
    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Enable or disable `OpenAPI` documentation
    #[must_use]
    pub fn enable_openapi(mut self, enable: bool) -> Self {
        self.config.enable_openapi = enable;
        self
    }

    /// Attach annotated frames to frame analyses
    #[must_use]
    pub fn annotate_frames(mut self, annotate: bool) -> Self {
        self.config.annotate_frames = annotate;
        self
    }

    #[must_use]
    pub fn fraud_threshold(mut self, threshold: f64) -> Self {
        self.config.fraud_threshold = threshold;
        self
    }

    /// Set the model server base URL; an empty string clears it
    #[must_use]
    pub fn detector_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.detector.url = if url.trim().is_empty() {
            None
        } else {
            Some(url.trim().to_string())
        };
        self
    }

    #[must_use]
    pub fn detector_timeout_secs(mut self, timeout: u64) -> Self {
        self.config.detector.timeout_secs = timeout;
        self
    }

    #[must_use]
    pub fn detector_backend(mut self, backend: impl Into<String>) -> Self {
        self.config.detector.backend = Some(backend.into());
        self
    }

    /// Set rate limiting configuration
    #[must_use]
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    #[must_use]
    pub fn websocket(mut self, websocket: WebSocketConfig) -> Self {
        self.config.websocket = websocket;
        self
    }

    /// Validate configuration and build `ServerConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.config;
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if c.host.trim().is_empty() {
            return fail("host cannot be empty");
        }

        // Request timeout validation
        if c.request_timeout_secs == 0 {
            return fail("request_timeout_secs must be greater than 0");
        }
        if c.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return fail("request_timeout_secs must be <= 300 (5 minutes)");
        }

        // Max body size validation
        if c.max_body_size == 0 {
            return fail("max_body_size must be greater than 0");
        }
        if c.max_body_size > MAX_BODY_SIZE_LIMIT {
            return fail("max_body_size must be <= 100MB");
        }

        if !(0.0..=1.0).contains(&c.fraud_threshold) {
            return fail("fraud_threshold must be between 0.0 and 1.0");
        }

        if c.detector.timeout_secs == 0 {
            return fail("detector.timeout_secs must be greater than 0");
        }
        if let Some(raw) = &c.detector.url {
            match url::Url::parse(raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(_) => return fail("detector.url must use http or https"),
                Err(e) => {
                    return Err(ConfigError::ValidationError(format!(
                        "detector.url is not a valid URL: {e}"
                    )));
                }
            }
        }

        // Rate limit validation
        if c.rate_limit.global_rpm == 0 {
            return fail("rate_limit.global_rpm must be greater than 0");
        }
        if c.rate_limit.per_ip_rpm == 0 {
            return fail("rate_limit.per_ip_rpm must be greater than 0");
        }

        if c.websocket.max_connections == 0 {
            return fail("websocket.max_connections must be greater than 0");
        }
        if c.websocket.max_message_size == 0 {
            return fail("websocket.max_message_size must be greater than 0");
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_parsed<T>(key: &str, type_name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid {type_name} value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    get_env_parsed(key, "u16")
}

fn get_env_u32(key: &str) -> Result<Option<u32>, ConfigError> {
    get_env_parsed(key, "u32")
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    get_env_parsed(key, "u64")
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    get_env_parsed(key, "usize")
}

fn get_env_f64(key: &str) -> Result<Option<f64>, ConfigError> {
    get_env_parsed(key, "f64")
}
