//! # PayPal Client
//!
//! Entry point: one `PayPal` per account/environment, holding the
//! transport (and therefore the token) that every resource borrows.

use crate::http::HttpClient;
use crate::orders::Orders;
use crate::payments::Payments;
use crate::plans::Plans;
use crate::retry::RetryPolicy;
use crate::subscriptions::Subscriptions;
use crate::webhooks::Webhooks;
use paypal_core::{ConfigDefaults, PartialConfig, PayPalConfig, PayPalResult};
use tracing::info;

/// PayPal REST client
#[derive(Debug)]
pub struct PayPal {
    config: PayPalConfig,
    http: HttpClient,
}

impl PayPal {
    /// Create a client for `config.environment`
    pub fn new(config: PayPalConfig) -> PayPalResult<Self> {
        let http = HttpClient::new(&config)?;

        info!(
            "Initialized PayPal client (environment: {}, base_url: {})",
            config.environment,
            http.base_url()
        );

        Ok(Self { config, http })
    }

    /// Create a client from `PAYPAL_*` environment variables
    pub fn from_env() -> PayPalResult<Self> {
        Self::new(PayPalConfig::from_env()?)
    }

    /// Create a client from registry defaults with `instance` layered on top
    pub fn with_defaults(
        defaults: &ConfigDefaults,
        instance: impl Into<PartialConfig>,
    ) -> PayPalResult<Self> {
        Self::new(defaults.resolve(instance)?)
    }

    /// Builder: replace the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.http = self.http.with_retry_policy(policy);
        self
    }

    /// Client against a mock PayPal; test builds and the `test-util` feature only
    #[cfg(any(test, feature = "test-util"))]
    pub fn with_base_url(
        config: PayPalConfig,
        base_url: impl Into<String>,
    ) -> PayPalResult<Self> {
        let http = HttpClient::with_base_url(&config, base_url)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    /// Webhook id from configuration, used for signature verification
    pub fn configured_webhook_id(&self) -> Option<&str> {
        self.config.webhook_id.as_deref()
    }

    /// Raw transport, for endpoints without a typed wrapper
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(&self.http)
    }

    pub fn plans(&self) -> Plans<'_> {
        Plans::new(&self.http)
    }

    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions::new(&self.http)
    }

    pub fn payments(&self) -> Payments<'_> {
        Payments::new(&self.http)
    }

    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(&self.http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{fast_policy, mount_token, test_config};
    use paypal_core::{Environment, LIVE_API_BASE, SANDBOX_API_BASE};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_with_defaults_layers_instance_over_registry() {
        let defaults = ConfigDefaults::new();
        defaults.set(PartialConfig {
            environment: Some(Environment::Live),
            client_secret: Some("default-secret".into()),
            webhook_id: Some("WH-DEFAULT".into()),
            ..Default::default()
        });

        let client = PayPal::with_defaults(
            &defaults,
            PartialConfig {
                client_id: Some("instance-id".into()),
                webhook_id: Some("WH-INSTANCE".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(client.config().client_id, "instance-id");
        assert_eq!(client.config().client_secret, "default-secret");
        assert_eq!(client.configured_webhook_id(), Some("WH-INSTANCE"));
        assert_eq!(client.http().base_url(), LIVE_API_BASE);
    }

    #[test]
    fn test_with_defaults_requires_credentials() {
        let err = PayPal::with_defaults(&ConfigDefaults::new(), PartialConfig::default()).unwrap_err();
        assert_eq!(err.error_type(), "configuration_error");
    }

    #[test]
    fn test_sandbox_never_targets_live_host() {
        let client = PayPal::new(test_config()).unwrap();
        assert_eq!(client.http().base_url(), SANDBOX_API_BASE);
        assert_ne!(client.http().base_url(), LIVE_API_BASE);
    }

    #[tokio::test]
    async fn test_resources_share_one_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "SHARED",
                "token_type": "Bearer",
                "expires_in": 32400
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/checkout/orders/O-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "O-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/billing/plans/P-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "P-1", "name": "Basic"})),
            )
            .mount(&server)
            .await;

        let client = PayPal::with_base_url(test_config(), server.uri())
            .unwrap()
            .with_retry_policy(fast_policy());

        let order = client.orders().retrieve("O-1").await.unwrap();
        let plan = client.plans().retrieve("P-1").await.unwrap();
        assert_eq!(order.id, "O-1");
        assert_eq!(plan.name, "Basic");
    }

    #[tokio::test]
    async fn test_concurrent_calls_complete_with_cold_token() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("GET"))
            .and(path("/v2/payments/captures/CAP-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "CAP-1",
                "status": "COMPLETED"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let client = PayPal::with_base_url(test_config(), server.uri()).unwrap();
        let payments = client.payments();

        let (a, b, c) = tokio::join!(
            payments.get_capture("CAP-1"),
            payments.get_capture("CAP-1"),
            payments.get_capture("CAP-1"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
    }
}
