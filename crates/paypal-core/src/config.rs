//! # PayPal Configuration
//!
//! Client configuration, layered defaults, and environment selection.
//!
//! Configuration is assembled from layers. A [`PartialConfig`] holds any
//! subset of the settings; [`ConfigDefaults`] is an explicit registry of
//! base values that every client built through it inherits, with the
//! instance layer winning field by field.

use crate::error::{PayPalError, PayPalResult};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Sandbox API host
pub const SANDBOX_API_BASE: &str = "https://api.sandbox.paypal.com";

/// Production API host
pub const LIVE_API_BASE: &str = "https://api.paypal.com";

/// Request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Target PayPal environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Live,
}

impl Environment {
    /// API base URL for this environment
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_API_BASE,
            Environment::Live => LIVE_API_BASE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PayPalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" => Ok(Environment::Live),
            other => Err(PayPalError::Configuration(format!(
                "environment must be 'sandbox' or 'live', got '{other}'"
            ))),
        }
    }
}

/// Complete, validated client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct PayPalConfig {
    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Sandbox or live
    pub environment: Environment,

    /// Webhook id used for signature verification
    pub webhook_id: Option<String>,

    /// Per-request timeout (30s when unset)
    pub timeout: Option<Duration>,

    /// Transient-failure retry budget per call (1 when unset)
    pub max_retries: Option<u32>,
}

impl PayPalConfig {
    /// Create config with explicit credentials
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            environment,
            webhook_id: None,
            timeout: None,
            max_retries: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_CLIENT_SECRET`
    ///
    /// Optional: `PAYPAL_ENVIRONMENT` (`sandbox` | `live`, default sandbox),
    /// `PAYPAL_WEBHOOK_ID`, `PAYPAL_TIMEOUT_MS`, `PAYPAL_MAX_RETRIES`.
    pub fn from_env() -> PayPalResult<Self> {
        PartialConfig::from_env()?.resolve()
    }

    /// Builder: set the webhook id
    pub fn with_webhook_id(mut self, webhook_id: impl Into<String>) -> Self {
        self.webhook_id = Some(webhook_id.into());
        self
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder: set the transient retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Effective request timeout
    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// API base URL for the configured environment
    pub fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }

    pub fn is_live(&self) -> bool {
        self.environment == Environment::Live
    }
}

impl fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("webhook_id", &self.webhook_id)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// A configuration layer where every setting is optional
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub webhook_id: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl PartialConfig {
    /// Read a layer from `PAYPAL_*` environment variables, loading `.env` first
    pub fn from_env() -> PayPalResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = env::var("PAYPAL_ENVIRONMENT")
            .ok()
            .map(|v| v.parse::<Environment>())
            .transpose()?;

        let timeout_ms = env::var("PAYPAL_TIMEOUT_MS")
            .ok()
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    PayPalError::Configuration(format!("PAYPAL_TIMEOUT_MS is not a number: {v}"))
                })
            })
            .transpose()?;

        let max_retries = env::var("PAYPAL_MAX_RETRIES")
            .ok()
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    PayPalError::Configuration(format!("PAYPAL_MAX_RETRIES is not a number: {v}"))
                })
            })
            .transpose()?;

        Ok(Self {
            client_id: env::var("PAYPAL_CLIENT_ID").ok(),
            client_secret: env::var("PAYPAL_CLIENT_SECRET").ok(),
            environment,
            webhook_id: env::var("PAYPAL_WEBHOOK_ID").ok(),
            timeout_ms,
            max_retries,
        })
    }

    /// Parse a layer from TOML text
    pub fn from_toml_str(content: &str) -> PayPalResult<Self> {
        toml::from_str(content)
            .map_err(|e| PayPalError::Configuration(format!("Invalid PayPal config TOML: {e}")))
    }

    /// Layer `over` on top of `self`; set fields in `over` win
    pub fn merge(&self, over: &PartialConfig) -> PartialConfig {
        PartialConfig {
            client_id: over.client_id.clone().or_else(|| self.client_id.clone()),
            client_secret: over
                .client_secret
                .clone()
                .or_else(|| self.client_secret.clone()),
            environment: over.environment.or(self.environment),
            webhook_id: over.webhook_id.clone().or_else(|| self.webhook_id.clone()),
            timeout_ms: over.timeout_ms.or(self.timeout_ms),
            max_retries: over.max_retries.or(self.max_retries),
        }
    }

    /// Validate the layer into a complete config
    pub fn resolve(self) -> PayPalResult<PayPalConfig> {
        let client_id = self
            .client_id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PayPalError::Configuration("PAYPAL_CLIENT_ID not set".to_string()))?;

        let client_secret = self
            .client_secret
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PayPalError::Configuration("PAYPAL_CLIENT_SECRET not set".to_string())
            })?;

        Ok(PayPalConfig {
            client_id,
            client_secret,
            environment: self.environment.unwrap_or_default(),
            webhook_id: self.webhook_id.filter(|v| !v.is_empty()),
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_retries: self.max_retries,
        })
    }
}

impl From<PayPalConfig> for PartialConfig {
    fn from(config: PayPalConfig) -> Self {
        Self {
            client_id: Some(config.client_id),
            client_secret: Some(config.client_secret),
            environment: Some(config.environment),
            webhook_id: config.webhook_id,
            timeout_ms: config
                .timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            max_retries: config.max_retries,
        }
    }
}

impl fmt::Debug for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("environment", &self.environment)
            .field("webhook_id", &self.webhook_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Registry of base configuration shared by the clients built through it.
///
/// `set` merges into whatever was set before (there is no reset);
/// `resolve` reads the current defaults and layers an instance config on
/// top. Clients already built keep the config they resolved.
#[derive(Debug, Default)]
pub struct ConfigDefaults {
    layer: RwLock<PartialConfig>,
}

impl ConfigDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with an initial layer
    pub fn with_layer(layer: PartialConfig) -> Self {
        Self {
            layer: RwLock::new(layer),
        }
    }

    /// Merge `layer` into the current defaults
    pub fn set(&self, layer: PartialConfig) {
        let mut current = self.layer.write().unwrap_or_else(PoisonError::into_inner);
        *current = current.merge(&layer);
    }

    /// Copy of the current defaults
    pub fn snapshot(&self) -> PartialConfig {
        self.layer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Layer `instance` over the defaults and validate
    pub fn resolve(&self, instance: impl Into<PartialConfig>) -> PayPalResult<PayPalConfig> {
        self.snapshot().merge(&instance.into()).resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!("LIVE".parse::<Environment>().unwrap(), Environment::Live);

        let err = "production".parse::<Environment>().unwrap_err();
        assert_eq!(err.error_type(), "configuration_error");
    }

    #[test]
    fn test_base_url_follows_environment() {
        let sandbox = PayPalConfig::new("id", "secret", Environment::Sandbox);
        let live = PayPalConfig::new("id", "secret", Environment::Live);

        assert_eq!(sandbox.base_url(), SANDBOX_API_BASE);
        assert_eq!(live.base_url(), LIVE_API_BASE);
        assert!(live.is_live());
    }

    #[test]
    fn test_timeout_default() {
        let config = PayPalConfig::new("id", "secret", Environment::Sandbox);
        assert_eq!(config.timeout_or_default(), Duration::from_millis(30_000));

        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout_or_default(), Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PayPalConfig::new("id", "super-secret", Environment::Sandbox);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_merge_prefers_upper_layer() {
        let base = PartialConfig {
            client_id: Some("base-id".into()),
            client_secret: Some("base-secret".into()),
            environment: Some(Environment::Live),
            timeout_ms: Some(10_000),
            ..Default::default()
        };
        let over = PartialConfig {
            client_id: Some("instance-id".into()),
            max_retries: Some(3),
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.client_id.as_deref(), Some("instance-id"));
        assert_eq!(merged.client_secret.as_deref(), Some("base-secret"));
        assert_eq!(merged.environment, Some(Environment::Live));
        assert_eq!(merged.timeout_ms, Some(10_000));
        assert_eq!(merged.max_retries, Some(3));
    }

    #[test]
    fn test_resolve_requires_credentials() {
        let err = PartialConfig {
            client_id: Some("id".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(err.to_string().contains("PAYPAL_CLIENT_SECRET"));
    }

    #[test]
    fn test_resolve_defaults_to_sandbox() {
        let config = PartialConfig {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_defaults_registry_merges_sets() {
        let defaults = ConfigDefaults::new();
        defaults.set(PartialConfig {
            environment: Some(Environment::Live),
            timeout_ms: Some(5_000),
            ..Default::default()
        });
        defaults.set(PartialConfig {
            timeout_ms: Some(7_000),
            ..Default::default()
        });

        let snapshot = defaults.snapshot();
        assert_eq!(snapshot.environment, Some(Environment::Live));
        assert_eq!(snapshot.timeout_ms, Some(7_000));
    }

    #[test]
    fn test_defaults_registry_instance_wins() {
        let defaults = ConfigDefaults::with_layer(PartialConfig {
            environment: Some(Environment::Live),
            webhook_id: Some("WH-BASE".into()),
            max_retries: Some(2),
            ..Default::default()
        });

        let config = defaults
            .resolve(PayPalConfig::new("id", "secret", Environment::Sandbox))
            .unwrap();

        // A complete instance config overrides every field it sets
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.webhook_id.as_deref(), Some("WH-BASE"));
        assert_eq!(config.max_retries, Some(2));
    }

    #[test]
    fn test_from_toml() {
        let layer = PartialConfig::from_toml_str(
            r#"
            environment = "live"
            webhook_id = "WH-123"
            timeout_ms = 15000
            "#,
        )
        .unwrap();

        assert_eq!(layer.environment, Some(Environment::Live));
        assert_eq!(layer.webhook_id.as_deref(), Some("WH-123"));
        assert_eq!(layer.timeout_ms, Some(15_000));

        assert!(PartialConfig::from_toml_str(r#"environment = "staging""#).is_err());
    }
}
