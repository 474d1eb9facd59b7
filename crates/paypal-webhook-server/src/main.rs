//! # paypal-webhooks
//!
//! ## Usage
//!
//! ```bash
//! export PAYPAL_CLIENT_ID=...
//! export PAYPAL_CLIENT_SECRET=...
//! export PAYPAL_WEBHOOK_ID=...
//! # optional: PAYPAL_ENVIRONMENT=live, PAYPAL_CONFIG_FILE=paypal.toml
//!
//! paypal-webhooks
//! ```

use paypal_core::REQUIRED_WEBHOOK_EVENTS;
use paypal_webhook_server::{routes, AppState, ServerConfig};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::from_config(&config)?;
    let addr = config.socket_addr()?;

    info!("Environment: {}", state.paypal.config().environment);
    match state.webhook_id {
        Some(ref id) => info!("Verifying deliveries for webhook {}", id),
        None => warn!("PAYPAL_WEBHOOK_ID not set; deliveries will be rejected"),
    }
    info!(
        "Subscribe the webhook to: {}",
        REQUIRED_WEBHOOK_EVENTS.join(", ")
    );

    let app = routes::create_router(state);

    info!("PayPal webhook receiver listening on http://{}", addr);
    info!("Webhook: POST http://{}/webhook/paypal", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
