//! # paypal-core
//!
//! Core types for the PayPal REST client.
//!
//! This crate provides:
//! - `PayPalConfig`, `PartialConfig` and `ConfigDefaults` for layered configuration
//! - `PayPalError` for typed error handling
//! - Domain records for orders, billing plans, subscriptions, payments and webhooks
//!
//! Records mirror the PayPal JSON shapes and are never mutated locally;
//! every state change is a request to the API.
//!
//! ## Example
//!
//! ```rust,ignore
//! use paypal_core::{ConfigDefaults, Environment, PartialConfig, PayPalConfig};
//!
//! let defaults = ConfigDefaults::new();
//! defaults.set(PartialConfig {
//!     environment: Some(Environment::Live),
//!     timeout_ms: Some(10_000),
//!     ..Default::default()
//! });
//!
//! let config = defaults.resolve(PartialConfig {
//!     client_id: Some("client-id".into()),
//!     client_secret: Some("client-secret".into()),
//!     ..Default::default()
//! })?;
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod order;
pub mod payment;
pub mod plan;
pub mod subscription;
pub mod webhook;

// Re-exports for convenience
pub use common::{
    find_link, Address, Link, ListResponse, Money, Name, PatchOp, PatchOperation, Payer, Phone,
    PhoneNumber, PhoneType, TaxInfo,
};
pub use config::{
    ConfigDefaults, Environment, PartialConfig, PayPalConfig, DEFAULT_TIMEOUT, LIVE_API_BASE,
    SANDBOX_API_BASE,
};
pub use error::{BoxError, ErrorDetail, PayPalError, PayPalResult, UNKNOWN_ERROR_CODE};
pub use order::{
    Amount, AmountBreakdown, ApplicationContext, ConfirmPaymentSourceParams, CreateOrderParams,
    Item, Order, OrderActionParams, OrderIntent, OrderStatus, PaymentSource, PurchaseUnit,
};
pub use payment::{
    Authorization, AuthorizationStatus, Capture, CaptureAuthorizationParams, CaptureStatus,
    ReauthorizeParams, Refund, RefundCaptureParams, RefundStatus,
};
pub use plan::{
    BillingCycle, CreatePlanParams, Frequency, IntervalUnit, ListPlansParams, PaymentPreferences,
    Plan, PlanStatus, PricingScheme, PricingSchemeUpdate, Taxes, TenureType, UpdatePricingParams,
};
pub use subscription::{
    CaptureSubscriptionParams, CreateSubscriptionParams, ListSubscriptionsParams,
    ReviseSubscriptionParams, ReviseSubscriptionResponse, Subscriber, Subscription,
    SubscriptionStatus, SubscriptionTransaction, DEFAULT_CANCEL_REASON,
};
pub use webhook::{
    ListEventsParams, ResendEventResponse, VerificationStatus, WebhookEvent, WebhookEventKind,
    WebhookVerificationRequest, WebhookVerificationResponse, REQUIRED_WEBHOOK_EVENTS,
};
