//! # Webhooks API
//!
//! Signature verification is delegated to PayPal
//! (`POST /v1/notifications/verify-webhook-signature`); nothing is checked
//! locally. Verification is a yes/no answer: provider rejections and
//! transport failures both come back as `false`.

use crate::http::HttpClient;
use crate::path::{segment, with_query};
use paypal_core::webhook::{
    ResendEventParams, HEADER_AUTH_ALGO, HEADER_CERT_URL, HEADER_TRANSMISSION_ID,
    HEADER_TRANSMISSION_SIG, HEADER_TRANSMISSION_TIME,
};
use paypal_core::{
    ListEventsParams, ListResponse, PayPalResult, ResendEventResponse, WebhookEvent,
    WebhookVerificationRequest, WebhookVerificationResponse,
};
use reqwest::header::HeaderMap;
use tracing::{debug, info, instrument, warn};

const VERIFY_PATH: &str = "/v1/notifications/verify-webhook-signature";
const EVENTS_PATH: &str = "/v1/notifications/webhooks-events";

/// The five transmission headers of a webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
}

impl WebhookHeaders {
    /// Extract from an HTTP header map; `None` if any header is missing
    pub fn from_header_map(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Some(Self {
            auth_algo: get(HEADER_AUTH_ALGO)?,
            cert_url: get(HEADER_CERT_URL)?,
            transmission_id: get(HEADER_TRANSMISSION_ID)?,
            transmission_sig: get(HEADER_TRANSMISSION_SIG)?,
            transmission_time: get(HEADER_TRANSMISSION_TIME)?,
        })
    }

    /// Like [`from_header_map`](Self::from_header_map), with missing headers
    /// left empty
    pub fn from_header_map_or_empty(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Self {
            auth_algo: get(HEADER_AUTH_ALGO),
            cert_url: get(HEADER_CERT_URL),
            transmission_id: get(HEADER_TRANSMISSION_ID),
            transmission_sig: get(HEADER_TRANSMISSION_SIG),
            transmission_time: get(HEADER_TRANSMISSION_TIME),
        }
    }

    /// Extract from name/value pairs, matching names case-insensitively
    pub fn from_pairs<'a, I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        let get = |name: &str| {
            pairs
                .clone()
                .into_iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.to_string())
        };
        Some(Self {
            auth_algo: get(HEADER_AUTH_ALGO)?,
            cert_url: get(HEADER_CERT_URL)?,
            transmission_id: get(HEADER_TRANSMISSION_ID)?,
            transmission_sig: get(HEADER_TRANSMISSION_SIG)?,
            transmission_time: get(HEADER_TRANSMISSION_TIME)?,
        })
    }

    fn into_request(
        self,
        webhook_id: &str,
        webhook_event: serde_json::Value,
    ) -> WebhookVerificationRequest {
        WebhookVerificationRequest {
            auth_algo: self.auth_algo,
            cert_url: self.cert_url,
            transmission_id: self.transmission_id,
            transmission_sig: self.transmission_sig,
            transmission_time: self.transmission_time,
            webhook_id: webhook_id.to_string(),
            webhook_event,
        }
    }
}

/// Webhooks resource
#[derive(Debug, Clone, Copy)]
pub struct Webhooks<'a> {
    http: &'a HttpClient,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Ask PayPal whether `body` was signed for `webhook_id`.
    ///
    /// `true` only when PayPal answers `SUCCESS`.
    #[instrument(skip(self, headers, body), fields(transmission_id = %headers.transmission_id))]
    pub async fn verify_signature(
        &self,
        headers: &WebhookHeaders,
        body: &str,
        webhook_id: &str,
    ) -> bool {
        let event: serde_json::Value = match serde_json::from_str(body) {
            Ok(event) => event,
            Err(e) => {
                warn!("Webhook body is not valid JSON: {}", e);
                return false;
            }
        };

        let request = headers.clone().into_request(webhook_id, event);
        let response: PayPalResult<WebhookVerificationResponse> =
            self.http.post(VERIFY_PATH, &request).await;

        match response {
            Ok(response) if response.is_success() => {
                debug!("Webhook signature verified");
                true
            }
            Ok(response) => {
                warn!(
                    "Webhook signature rejected: status={:?}",
                    response.verification_status
                );
                false
            }
            Err(e) => {
                warn!("Webhook verification failed: {}", e);
                false
            }
        }
    }

    /// Verify straight from request headers. Missing transmission headers
    /// are sent empty and left for PayPal to reject.
    pub async fn verify_raw(&self, headers: &HeaderMap, body: &str, webhook_id: &str) -> bool {
        let transmission = WebhookHeaders::from_header_map_or_empty(headers);
        self.verify_signature(&transmission, body, webhook_id).await
    }

    /// Verify, then parse. `None` when verification fails or the body is
    /// not a webhook event.
    pub async fn construct_event(
        &self,
        headers: &WebhookHeaders,
        body: &str,
        webhook_id: &str,
    ) -> Option<WebhookEvent> {
        if !self.verify_signature(headers, body, webhook_id).await {
            return None;
        }

        match serde_json::from_str::<WebhookEvent>(body) {
            Ok(event) => {
                info!(
                    "Received PayPal webhook event: {} ({})",
                    event.event_type, event.id
                );
                Some(event)
            }
            Err(e) => {
                warn!("Verified webhook body is not an event: {}", e);
                None
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        params: &ListEventsParams,
    ) -> PayPalResult<ListResponse<WebhookEvent>> {
        self.http.get(&with_query(EVENTS_PATH, params)?).await
    }

    /// Redeliver an event to the given webhooks (all of them when empty)
    #[instrument(skip(self))]
    pub async fn resend_event(
        &self,
        event_id: &str,
        webhook_ids: &[String],
    ) -> PayPalResult<ResendEventResponse> {
        let path = format!("{}/{}/resend", EVENTS_PATH, segment(event_id));
        let body = ResendEventParams {
            webhook_ids: webhook_ids.to_vec(),
        };
        self.http.post(&path, &body).await
    }
}
