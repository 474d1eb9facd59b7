//! # Subscriptions API
//!
//! `/v1/billing/subscriptions`. Lifecycle transitions (suspend, activate,
//! cancel) are round trips; re-fetch the subscription to observe the new
//! status.

use crate::http::HttpClient;
use crate::path::{segment, with_query};
use paypal_core::subscription::{StatusChangeReason, TransactionsQuery};
use paypal_core::{
    CaptureSubscriptionParams, CreateSubscriptionParams, ListResponse, ListSubscriptionsParams,
    PayPalResult, ReviseSubscriptionParams, ReviseSubscriptionResponse, Subscription,
    SubscriptionTransaction, DEFAULT_CANCEL_REASON,
};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

const SUBSCRIPTIONS_PATH: &str = "/v1/billing/subscriptions";

/// Subscriptions resource
#[derive(Debug, Clone, Copy)]
pub struct Subscriptions<'a> {
    http: &'a HttpClient,
}

impl<'a> Subscriptions<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn subscription_path(id: &str) -> String {
        format!("{}/{}", SUBSCRIPTIONS_PATH, segment(id))
    }

    #[instrument(skip(self, params), fields(plan_id = %params.plan_id))]
    pub async fn create(&self, params: &CreateSubscriptionParams) -> PayPalResult<Subscription> {
        let subscription: Subscription = self.http.post(SUBSCRIPTIONS_PATH, params).await?;
        info!("Created PayPal subscription: {}", subscription.id);
        Ok(subscription)
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, id: &str) -> PayPalResult<Subscription> {
        self.http.get(&Self::subscription_path(id)).await
    }

    /// Change plan or quantity; the response carries the approval link
    #[instrument(skip(self, params))]
    pub async fn revise(
        &self,
        id: &str,
        params: &ReviseSubscriptionParams,
    ) -> PayPalResult<ReviseSubscriptionResponse> {
        let path = format!("{}/revise", Self::subscription_path(id));
        self.http.post(&path, params).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListSubscriptionsParams,
    ) -> PayPalResult<ListResponse<Subscription>> {
        self.http.get(&with_query(SUBSCRIPTIONS_PATH, params)?).await
    }

    /// Cancel; `None` sends the default reason
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> PayPalResult<()> {
        let body = StatusChangeReason {
            reason: reason.unwrap_or(DEFAULT_CANCEL_REASON).to_string(),
        };
        let path = format!("{}/cancel", Self::subscription_path(id));
        let _: IgnoredAny = self.http.post(&path, &body).await?;
        info!("Cancelled PayPal subscription: {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn suspend(&self, id: &str, reason: &str) -> PayPalResult<()> {
        let body = StatusChangeReason {
            reason: reason.to_string(),
        };
        let path = format!("{}/suspend", Self::subscription_path(id));
        let _: IgnoredAny = self.http.post(&path, &body).await?;
        info!("Suspended PayPal subscription: {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: &str, reason: Option<&str>) -> PayPalResult<()> {
        let path = format!("{}/activate", Self::subscription_path(id));
        let _: IgnoredAny = match reason {
            Some(reason) => {
                let body = StatusChangeReason {
                    reason: reason.to_string(),
                };
                self.http.post(&path, &body).await?
            }
            None => self.http.post_empty(&path).await?,
        };
        info!("Activated PayPal subscription: {}", id);
        Ok(())
    }

    /// Charge an outstanding balance
    #[instrument(skip(self, params))]
    pub async fn capture(
        &self,
        id: &str,
        params: &CaptureSubscriptionParams,
    ) -> PayPalResult<Option<SubscriptionTransaction>> {
        let path = format!("{}/capture", Self::subscription_path(id));
        self.http.post(&path, params).await
    }

    /// Payments made between `start_time` and `end_time` (RFC 3339)
    #[instrument(skip(self))]
    pub async fn transactions(
        &self,
        id: &str,
        query: &TransactionsQuery,
    ) -> PayPalResult<ListResponse<SubscriptionTransaction>> {
        let path = format!("{}/transactions", Self::subscription_path(id));
        self.http.get(&with_query(&path, query)?).await
    }
}
