//! # paypal-webhook-server
//!
//! Axum receiver for PayPal webhook deliveries.
//!
//! Each delivery is verified through PayPal's
//! `verify-webhook-signature` endpoint and, once verified, dispatched to a
//! [`paypal_client::WebhookHandler`].
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/webhook/paypal` | PayPal webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppState, ServerConfig};
