//! # Application State
//!
//! Server configuration and the state shared by every request: the PayPal
//! client, the event handler and the webhook id deliveries are verified
//! against.

use anyhow::Context;
use paypal_client::{LoggingWebhookHandler, PayPal, WebhookHandler};
use paypal_core::{ConfigDefaults, PartialConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// TOML file with PayPal defaults, layered beneath `PAYPAL_*` variables
    pub paypal_config_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            paypal_config_file: std::env::var("PAYPAL_CONFIG_FILE").ok().map(PathBuf::from),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Registry seeded from the TOML file, if one is configured
    pub fn paypal_defaults(&self) -> anyhow::Result<ConfigDefaults> {
        let defaults = ConfigDefaults::new();

        if let Some(ref path) = self.paypal_config_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let layer = PartialConfig::from_toml_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!("Loaded PayPal defaults from {}", path.display());
            defaults.set(layer);
        }

        Ok(defaults)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub paypal: Arc<PayPal>,
    pub handler: Arc<dyn WebhookHandler>,
    pub webhook_id: Option<String>,
}

impl AppState {
    /// State with the logging handler and the client's configured webhook id
    pub fn new(paypal: PayPal) -> Self {
        Self::with_handler(paypal, Arc::new(LoggingWebhookHandler))
    }

    pub fn with_handler(paypal: PayPal, handler: Arc<dyn WebhookHandler>) -> Self {
        let webhook_id = paypal.configured_webhook_id().map(str::to_string);
        Self {
            paypal: Arc::new(paypal),
            handler,
            webhook_id,
        }
    }

    /// Build the client from the config file and `PAYPAL_*` variables
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let defaults = config.paypal_defaults()?;
        let env_layer = PartialConfig::from_env().context("Invalid PAYPAL_* environment")?;
        let paypal = PayPal::with_defaults(&defaults, env_layer)
            .context("Failed to initialize PayPal client")?;
        Ok(Self::new(paypal))
    }
}
