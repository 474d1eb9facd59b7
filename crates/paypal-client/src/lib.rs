//! # paypal-client
//!
//! Async client for the PayPal REST API.
//!
//! - **Transport** ([`HttpClient`]): OAuth2 client-credentials tokens cached
//!   until 30 seconds before expiry, one forced refresh and replay on HTTP
//!   401, exponential backoff on network failures, 5xx and 429, and
//!   translation of provider error payloads into [`PayPalError`].
//! - **Resources**: [`Orders`], [`Plans`], [`Subscriptions`], [`Payments`]
//!   and [`Webhooks`], each a thin borrow of the client's transport.
//! - **Webhooks**: verification through PayPal and typed dispatch to a
//!   [`WebhookHandler`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paypal_client::PayPal;
//! use paypal_core::{Amount, CreateOrderParams, OrderIntent, PurchaseUnit};
//!
//! let paypal = PayPal::from_env()?;
//!
//! let order = paypal
//!     .orders()
//!     .create(&CreateOrderParams::new(
//!         OrderIntent::Capture,
//!         vec![PurchaseUnit::new(Amount::new("USD", "100.00"))],
//!     ))
//!     .await?;
//!
//! // Redirect the buyer to order.approve_url(), then:
//! let captured = paypal.orders().capture(&order.id, None).await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use paypal_client::{dispatch_webhook_event, WebhookHandler, WebhookHeaders};
//!
//! struct Fulfilment;
//!
//! #[async_trait::async_trait]
//! impl WebhookHandler for Fulfilment {
//!     async fn on_capture_completed(&self, capture: Capture) -> PayPalResult<()> {
//!         // ship it
//!         Ok(())
//!     }
//! }
//!
//! let headers = WebhookHeaders::from_header_map(&request_headers).ok_or(BadRequest)?;
//! if let Some(event) = paypal.webhooks().construct_event(&headers, &body, webhook_id).await {
//!     dispatch_webhook_event(&Fulfilment, event).await?;
//! }
//! ```

pub mod client;
pub mod dispatch;
pub mod http;
pub mod orders;
mod path;
pub mod payments;
pub mod plans;
pub mod retry;
pub mod subscriptions;
pub mod token;
pub mod webhooks;

pub use client::PayPal;
pub use dispatch::{dispatch_webhook_event, LoggingWebhookHandler, WebhookHandler};
pub use http::{HttpClient, RequestOptions, REQUEST_ID_HEADER};
pub use orders::Orders;
pub use payments::Payments;
pub use plans::Plans;
pub use retry::RetryPolicy;
pub use subscriptions::Subscriptions;
pub use token::AccessToken;
pub use webhooks::{WebhookHeaders, Webhooks};

pub use paypal_core::{PayPalError, PayPalResult};
