//! # Routes
//!
//! - `GET  /health`, `GET /` - Health check
//! - `POST /webhook/paypal` - PayPal webhook receiver

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    // Raw body required for verification; no JSON extractor here
    let webhook_routes = Router::new().route("/paypal", post(handlers::paypal_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/webhook", webhook_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::{TestRequest, TestServer};
    use async_trait::async_trait;
    use paypal_client::{PayPal, WebhookHandler};
    use paypal_core::{Capture, Environment, PayPalConfig, PayPalError, PayPalResult};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CAPTURE_EVENT: &str = concat!(
        r#"{"id":"WH-58D329510W468432D-8HN650336L201105X","event_version":"1.0","#,
        r#""create_time":"2024-02-16T15:00:00.000Z","resource_type":"capture","#,
        r#""event_type":"PAYMENT.CAPTURE.COMPLETED","summary":"Payment completed","#,
        r#""resource":{"id":"42311647XV020574X","status":"COMPLETED","#,
        r#""amount":{"currency_code":"USD","value":"7.47"}},"links":[]}"#
    );

    /// Records captured ids, or fails every capture when `fail` is set
    #[derive(Default)]
    struct RecordingHandler {
        captures: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl WebhookHandler for RecordingHandler {
        async fn on_capture_completed(&self, capture: Capture) -> PayPalResult<()> {
            if self.fail {
                return Err(PayPalError::Configuration(
                    "fulfilment store unavailable".to_string(),
                ));
            }
            self.captures.lock().unwrap().push(capture.id);
            Ok(())
        }
    }

    async fn mock_paypal(verification_status: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "TOKEN",
                "token_type": "Bearer",
                "expires_in": 32400
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/notifications/verify-webhook-signature"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"verification_status": verification_status})),
            )
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn mocked_state(server: &MockServer, handler: Arc<RecordingHandler>) -> AppState {
        let config = PayPalConfig::new("client-id", "client-secret", Environment::Sandbox)
            .with_webhook_id("WH-1");
        let paypal = PayPal::with_base_url(config, server.uri()).unwrap();
        AppState::with_handler(paypal, handler)
    }

    fn state(webhook_id: Option<&str>) -> AppState {
        let mut config = PayPalConfig::new("client-id", "client-secret", Environment::Sandbox);
        if let Some(id) = webhook_id {
            config = config.with_webhook_id(id);
        }
        AppState::new(PayPal::new(config).unwrap())
    }

    fn transmission_headers(mut request: TestRequest) -> TestRequest {
        for (name, value) in [
            ("paypal-auth-algo", "SHA256withRSA"),
            ("paypal-cert-url", "https://api.sandbox.paypal.com/v1/notifications/certs/CERT"),
            ("paypal-transmission-id", "69cd13f0-d67a-11e5-baa3-778b53f4ae55"),
            ("paypal-transmission-sig", "c2lnbmF0dXJl"),
            ("paypal-transmission-time", "2024-02-16T15:00:00Z"),
        ] {
            request = request.add_header(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        request
    }

    #[tokio::test]
    async fn test_health() {
        let server = TestServer::new(create_router(state(None))).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json_contains(&json!({"status": "healthy"}));

        server.get("/").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_webhook_without_id_is_configuration_error() {
        let server = TestServer::new(create_router(state(None))).unwrap();

        let response = server.post("/webhook/paypal").text("{}").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json_contains(&json!({"code": 500}));
    }

    #[tokio::test]
    async fn test_webhook_without_headers_is_rejected() {
        let server = TestServer::new(create_router(state(Some("WH-1")))).unwrap();

        let response = server.post("/webhook/paypal").text("{}").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_with_invalid_body_is_rejected() {
        let server = TestServer::new(create_router(state(Some("WH-1")))).unwrap();

        let response = transmission_headers(server.post("/webhook/paypal"))
            .text("not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json_contains(&json!({"error": "Webhook verification failed"}));
    }

    #[tokio::test]
    async fn test_verified_delivery_is_dispatched() {
        let paypal = mock_paypal("SUCCESS").await;
        let handler = Arc::new(RecordingHandler::default());
        let server = TestServer::new(create_router(mocked_state(&paypal, handler.clone()))).unwrap();

        let response = transmission_headers(server.post("/webhook/paypal"))
            .text(CAPTURE_EVENT)
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({"received": true}));

        assert_eq!(
            *handler.captures.lock().unwrap(),
            vec!["42311647XV020574X".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_signature_is_bad_request() {
        let paypal = mock_paypal("FAILURE").await;
        let handler = Arc::new(RecordingHandler::default());
        let server = TestServer::new(create_router(mocked_state(&paypal, handler.clone()))).unwrap();

        let response = transmission_headers(server.post("/webhook/paypal"))
            .text(CAPTURE_EVENT)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json_contains(&json!({"error": "Webhook verification failed"}));

        assert!(handler.captures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_response() {
        let paypal = mock_paypal("SUCCESS").await;
        let handler = Arc::new(RecordingHandler {
            fail: true,
            ..Default::default()
        });
        let server = TestServer::new(create_router(mocked_state(&paypal, handler))).unwrap();

        let response = transmission_headers(server.post("/webhook/paypal"))
            .text(CAPTURE_EVENT)
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json_contains(&json!({"code": 500}));
    }
}
