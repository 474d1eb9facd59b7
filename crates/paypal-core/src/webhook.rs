//! # Webhook Types
//!
//! Webhook events, signature verification payloads and event listing
//! (`/v1/notifications`).

use crate::common::Link;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Transmission headers PayPal attaches to every webhook delivery
pub const HEADER_AUTH_ALGO: &str = "paypal-auth-algo";
pub const HEADER_CERT_URL: &str = "paypal-cert-url";
pub const HEADER_TRANSMISSION_ID: &str = "paypal-transmission-id";
pub const HEADER_TRANSMISSION_SIG: &str = "paypal-transmission-sig";
pub const HEADER_TRANSMISSION_TIME: &str = "paypal-transmission-time";

/// A webhook event notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Provider-defined payload; shape depends on `resource_type`
    #[serde(default)]
    pub resource: serde_json::Value,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl WebhookEvent {
    /// Classify the event type
    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::from_event_type(&self.event_type)
    }

    /// Decode the resource into a typed record (e.g. `Capture`)
    pub fn resource_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.resource)
    }

    /// `id` field of the resource, when present
    pub fn resource_id(&self) -> Option<&str> {
        self.resource.get("id").and_then(|v| v.as_str())
    }
}

/// Event types the dispatcher understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutOrderApproved,
    CheckoutOrderCompleted,
    PaymentCaptureCompleted,
    PaymentCaptureDenied,
    PaymentCapturePending,
    PaymentCaptureRefunded,
    PaymentAuthorizationCreated,
    PaymentAuthorizationVoided,
    SubscriptionCreated,
    SubscriptionActivated,
    SubscriptionSuspended,
    SubscriptionCancelled,
    SubscriptionExpired,
    SubscriptionPaymentFailed,
    PlanCreated,
    PlanUpdated,
    PlanActivated,
    PlanDeactivated,
    Unknown(String),
}

impl WebhookEventKind {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            "CHECKOUT.ORDER.APPROVED" => WebhookEventKind::CheckoutOrderApproved,
            "CHECKOUT.ORDER.COMPLETED" => WebhookEventKind::CheckoutOrderCompleted,
            "PAYMENT.CAPTURE.COMPLETED" => WebhookEventKind::PaymentCaptureCompleted,
            "PAYMENT.CAPTURE.DENIED" => WebhookEventKind::PaymentCaptureDenied,
            "PAYMENT.CAPTURE.PENDING" => WebhookEventKind::PaymentCapturePending,
            "PAYMENT.CAPTURE.REFUNDED" => WebhookEventKind::PaymentCaptureRefunded,
            "PAYMENT.AUTHORIZATION.CREATED" => WebhookEventKind::PaymentAuthorizationCreated,
            "PAYMENT.AUTHORIZATION.VOIDED" => WebhookEventKind::PaymentAuthorizationVoided,
            "BILLING.SUBSCRIPTION.CREATED" => WebhookEventKind::SubscriptionCreated,
            "BILLING.SUBSCRIPTION.ACTIVATED" => WebhookEventKind::SubscriptionActivated,
            "BILLING.SUBSCRIPTION.SUSPENDED" => WebhookEventKind::SubscriptionSuspended,
            "BILLING.SUBSCRIPTION.CANCELLED" => WebhookEventKind::SubscriptionCancelled,
            "BILLING.SUBSCRIPTION.EXPIRED" => WebhookEventKind::SubscriptionExpired,
            "BILLING.SUBSCRIPTION.PAYMENT.FAILED" => WebhookEventKind::SubscriptionPaymentFailed,
            "BILLING.PLAN.CREATED" => WebhookEventKind::PlanCreated,
            "BILLING.PLAN.UPDATED" => WebhookEventKind::PlanUpdated,
            "BILLING.PLAN.ACTIVATED" => WebhookEventKind::PlanActivated,
            "BILLING.PLAN.DEACTIVATED" => WebhookEventKind::PlanDeactivated,
            other => WebhookEventKind::Unknown(other.to_string()),
        }
    }
}

/// Event types that should be subscribed in the PayPal dashboard for the
/// dispatcher to see every handled kind
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "CHECKOUT.ORDER.APPROVED",
    "CHECKOUT.ORDER.COMPLETED",
    "PAYMENT.CAPTURE.COMPLETED",
    "PAYMENT.CAPTURE.DENIED",
    "PAYMENT.CAPTURE.PENDING",
    "PAYMENT.CAPTURE.REFUNDED",
    "PAYMENT.AUTHORIZATION.CREATED",
    "PAYMENT.AUTHORIZATION.VOIDED",
    "BILLING.SUBSCRIPTION.CREATED",
    "BILLING.SUBSCRIPTION.ACTIVATED",
    "BILLING.SUBSCRIPTION.SUSPENDED",
    "BILLING.SUBSCRIPTION.CANCELLED",
    "BILLING.SUBSCRIPTION.EXPIRED",
    "BILLING.SUBSCRIPTION.PAYMENT.FAILED",
    "BILLING.PLAN.CREATED",
    "BILLING.PLAN.UPDATED",
    "BILLING.PLAN.ACTIVATED",
    "BILLING.PLAN.DEACTIVATED",
];

/// Body of `POST /v1/notifications/verify-webhook-signature`.
///
/// `webhook_event` is the delivered body as parsed JSON. PayPal checks the
/// signature against it, so object keys keep their delivered order
/// (`serde_json` is built with `preserve_order`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookVerificationRequest {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
    pub webhook_event: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookVerificationResponse {
    pub verification_status: VerificationStatus,
}

impl WebhookVerificationResponse {
    pub fn is_success(&self) -> bool {
        self.verification_status == VerificationStatus::Success
    }
}

/// Query for `GET /v1/notifications/webhooks-events`; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListEventsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// Body of `POST /v1/notifications/webhooks-events/{id}/resend`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendEventParams {
    pub webhook_ids: Vec<String>,
}

/// Response of the resend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResendEventResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub webhook_ids: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}
