//! Webhook event dispatch.
//!
//! Routes a verified [`WebhookEvent`] to the matching [`WebhookHandler`]
//! method with its resource decoded into the typed record.

use async_trait::async_trait;
use paypal_core::{
    Authorization, Capture, Order, PayPalError, PayPalResult, Plan, Refund, Subscription,
    WebhookEvent, WebhookEventKind,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Webhook event handler
///
/// Implement the methods for the events you care about; the rest log.
#[allow(unused_variables)]
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Buyer approved a checkout order
    async fn on_order_approved(&self, order: Order) -> PayPalResult<()> {
        info!("Order approved: {}", order.id);
        Ok(())
    }

    async fn on_order_completed(&self, order: Order) -> PayPalResult<()> {
        info!("Order completed: {}", order.id);
        Ok(())
    }

    /// Funds captured; the usual fulfilment trigger
    async fn on_capture_completed(&self, capture: Capture) -> PayPalResult<()> {
        info!(
            "Capture completed: id={}, amount={:?}",
            capture.id,
            capture.amount.as_ref().map(|m| format!("{} {}", m.value, m.currency_code))
        );
        Ok(())
    }

    async fn on_capture_denied(&self, capture: Capture) -> PayPalResult<()> {
        warn!("Capture denied: {}", capture.id);
        Ok(())
    }

    async fn on_capture_pending(&self, capture: Capture) -> PayPalResult<()> {
        info!("Capture pending: {}", capture.id);
        Ok(())
    }

    async fn on_capture_refunded(&self, refund: Refund) -> PayPalResult<()> {
        info!("Capture refunded: refund={}", refund.id);
        Ok(())
    }

    async fn on_authorization_created(&self, authorization: Authorization) -> PayPalResult<()> {
        info!("Authorization created: {}", authorization.id);
        Ok(())
    }

    async fn on_authorization_voided(&self, authorization: Authorization) -> PayPalResult<()> {
        info!("Authorization voided: {}", authorization.id);
        Ok(())
    }

    /// Any `BILLING.SUBSCRIPTION.*` lifecycle event except payment failure
    async fn on_subscription_event(
        &self,
        kind: WebhookEventKind,
        subscription: Subscription,
    ) -> PayPalResult<()> {
        info!("Subscription {:?}: {}", kind, subscription.id);
        Ok(())
    }

    async fn on_subscription_payment_failed(&self, subscription: Subscription) -> PayPalResult<()> {
        warn!("Subscription payment failed: {}", subscription.id);
        Ok(())
    }

    /// Any `BILLING.PLAN.*` event
    async fn on_plan_event(&self, kind: WebhookEventKind, plan: Plan) -> PayPalResult<()> {
        info!("Plan {:?}: {}", kind, plan.id);
        Ok(())
    }

    /// Called for unknown/unhandled events
    async fn on_unknown_event(&self, event: &WebhookEvent) -> PayPalResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Handler that only logs
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

fn resource<T: DeserializeOwned>(event: &WebhookEvent) -> PayPalResult<T> {
    event.resource_as().map_err(|e| {
        PayPalError::Serialization(format!(
            "Invalid resource in {} event {}: {}",
            event.event_type, event.id, e
        ))
    })
}

/// Dispatch a webhook event to the appropriate handler method
pub async fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> PayPalResult<()> {
    use WebhookEventKind::*;

    let kind = event.kind();
    match kind {
        CheckoutOrderApproved => handler.on_order_approved(resource(&event)?).await,
        CheckoutOrderCompleted => handler.on_order_completed(resource(&event)?).await,
        PaymentCaptureCompleted => handler.on_capture_completed(resource(&event)?).await,
        PaymentCaptureDenied => handler.on_capture_denied(resource(&event)?).await,
        PaymentCapturePending => handler.on_capture_pending(resource(&event)?).await,
        PaymentCaptureRefunded => handler.on_capture_refunded(resource(&event)?).await,
        PaymentAuthorizationCreated => handler.on_authorization_created(resource(&event)?).await,
        PaymentAuthorizationVoided => handler.on_authorization_voided(resource(&event)?).await,
        SubscriptionPaymentFailed => {
            handler
                .on_subscription_payment_failed(resource(&event)?)
                .await
        }
        SubscriptionCreated | SubscriptionActivated | SubscriptionSuspended
        | SubscriptionCancelled | SubscriptionExpired => {
            let subscription = resource(&event)?;
            handler.on_subscription_event(kind, subscription).await
        }
        PlanCreated | PlanUpdated | PlanActivated | PlanDeactivated => {
            let plan = resource(&event)?;
            handler.on_plan_event(kind, plan).await
        }
        Unknown(_) => handler.on_unknown_event(&event).await,
    }
}
