//! # Payments API
//!
//! Captures, refunds and authorizations under `/v2/payments`.

use crate::http::HttpClient;
use crate::path::segment;
use paypal_core::{
    Authorization, Capture, CaptureAuthorizationParams, PayPalResult, ReauthorizeParams, Refund,
    RefundCaptureParams,
};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

const CAPTURES_PATH: &str = "/v2/payments/captures";
const REFUNDS_PATH: &str = "/v2/payments/refunds";
const AUTHORIZATIONS_PATH: &str = "/v2/payments/authorizations";

/// Payments resource
#[derive(Debug, Clone, Copy)]
pub struct Payments<'a> {
    http: &'a HttpClient,
}

impl<'a> Payments<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    #[instrument(skip(self))]
    pub async fn get_capture(&self, id: &str) -> PayPalResult<Capture> {
        self.http
            .get(&format!("{}/{}", CAPTURES_PATH, segment(id)))
            .await
    }

    /// Refund a capture; default params refund the full amount
    #[instrument(skip(self, params))]
    pub async fn refund_capture(
        &self,
        capture_id: &str,
        params: &RefundCaptureParams,
    ) -> PayPalResult<Refund> {
        let path = format!("{}/{}/refund", CAPTURES_PATH, segment(capture_id));
        let refund: Refund = self.http.post(&path, params).await?;
        info!("Refunded PayPal capture {}: refund={}", capture_id, refund.id);
        Ok(refund)
    }

    #[instrument(skip(self))]
    pub async fn get_refund(&self, id: &str) -> PayPalResult<Refund> {
        self.http
            .get(&format!("{}/{}", REFUNDS_PATH, segment(id)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_authorization(&self, id: &str) -> PayPalResult<Authorization> {
        self.http
            .get(&format!("{}/{}", AUTHORIZATIONS_PATH, segment(id)))
            .await
    }

    #[instrument(skip(self, params))]
    pub async fn capture_authorization(
        &self,
        authorization_id: &str,
        params: &CaptureAuthorizationParams,
    ) -> PayPalResult<Capture> {
        let path = format!("{}/{}/capture", AUTHORIZATIONS_PATH, segment(authorization_id));
        let capture: Capture = self.http.post(&path, params).await?;
        info!(
            "Captured PayPal authorization {}: capture={}",
            authorization_id, capture.id
        );
        Ok(capture)
    }

    #[instrument(skip(self, params))]
    pub async fn reauthorize(
        &self,
        authorization_id: &str,
        params: &ReauthorizeParams,
    ) -> PayPalResult<Authorization> {
        let path = format!(
            "{}/{}/reauthorize",
            AUTHORIZATIONS_PATH,
            segment(authorization_id)
        );
        self.http.post(&path, params).await
    }

    #[instrument(skip(self))]
    pub async fn void_authorization(&self, authorization_id: &str) -> PayPalResult<()> {
        let path = format!("{}/{}/void", AUTHORIZATIONS_PATH, segment(authorization_id));
        let _: IgnoredAny = self.http.post_empty(&path).await?;
        info!("Voided PayPal authorization: {}", authorization_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{client_for, mount_token};
    use paypal_core::{AuthorizationStatus, CaptureStatus, Money, RefundStatus};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_full_refund_sends_empty_object() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("POST"))
            .and(path("/v2/payments/captures/2GG279541U471931P/refund"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "1JU08902781691411",
                "status": "COMPLETED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let refund = Payments::new(&http)
            .refund_capture("2GG279541U471931P", &RefundCaptureParams::default())
            .await
            .unwrap();

        assert_eq!(refund.id, "1JU08902781691411");
        assert_eq!(refund.status, RefundStatus::Completed);
    }

    #[tokio::test]
    async fn test_capture_authorization() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("POST"))
            .and(path("/v2/payments/authorizations/0VF52814937998046/capture"))
            .and(body_json(json!({
                "amount": {"currency_code": "USD", "value": "10.99"},
                "final_capture": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "2GG279541U471931P",
                "status": "COMPLETED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let params = CaptureAuthorizationParams {
            amount: Some(Money::new("USD", "10.99")),
            final_capture: Some(true),
            ..Default::default()
        };
        let capture = Payments::new(&http)
            .capture_authorization("0VF52814937998046", &params)
            .await
            .unwrap();

        assert_eq!(capture.status, CaptureStatus::Completed);
    }

    #[tokio::test]
    async fn test_get_and_void_authorization() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("GET"))
            .and(path("/v2/payments/authorizations/AUTH-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "AUTH-1",
                "status": "CREATED"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/payments/authorizations/AUTH-1/void"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let payments = Payments::new(&http);

        let authorization = payments.get_authorization("AUTH-1").await.unwrap();
        assert_eq!(authorization.status, AuthorizationStatus::Created);
        payments.void_authorization("AUTH-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_capture_is_api_error() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("GET"))
            .and(path("/v2/payments/captures/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "name": "RESOURCE_NOT_FOUND",
                "message": "The specified resource does not exist.",
                "debug_id": "f0c2a3b1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let err = Payments::new(&http).get_capture("NOPE").await.unwrap_err();
        assert_eq!(err.code(), Some("RESOURCE_NOT_FOUND"));
        assert_eq!(err.debug_id(), Some("f0c2a3b1"));
    }
}
