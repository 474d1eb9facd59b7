//! # Request Handlers

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use paypal_client::{dispatch_webhook_event, WebhookHeaders};
use paypal_core::PayPalError;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

fn paypal_error_to_response(err: PayPalError) -> HandlerError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let Some(debug_id) = err.debug_id() {
        response = response.with_details(format!("debug_id={debug_id}"));
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "paypal-webhooks",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// PayPal webhook receiver: verify with PayPal, then dispatch
#[instrument(skip_all)]
pub async fn paypal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let webhook_id = state.webhook_id.as_deref().ok_or_else(|| {
        error!("PAYPAL_WEBHOOK_ID is not configured");
        paypal_error_to_response(PayPalError::Configuration(
            "PAYPAL_WEBHOOK_ID not set".to_string(),
        ))
    })?;

    let transmission = WebhookHeaders::from_header_map(&headers).ok_or_else(|| {
        warn!("Webhook delivery without PayPal transmission headers");
        bad_request("Missing PayPal transmission headers")
    })?;

    let body = std::str::from_utf8(&body).map_err(|_| bad_request("Body is not UTF-8"))?;

    let event = state
        .paypal
        .webhooks()
        .construct_event(&transmission, body, webhook_id)
        .await
        .ok_or_else(|| bad_request("Webhook verification failed"))?;

    info!(
        "Received webhook: type={}, id={}",
        event.event_type, event.id
    );

    dispatch_webhook_event(state.handler.as_ref(), event)
        .await
        .map_err(|e| {
            error!("Webhook handler error: {}", e);
            paypal_error_to_response(e)
        })?;

    Ok(Json(serde_json::json!({ "received": true })))
}
