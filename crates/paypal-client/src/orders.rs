//! # Orders API
//!
//! `/v2/checkout/orders`: create an order, send the buyer to the approve
//! link, then authorize or capture it.

use crate::http::HttpClient;
use crate::path::segment;
use paypal_core::{
    ConfirmPaymentSourceParams, CreateOrderParams, Order, OrderActionParams, PatchOperation,
    PayPalResult,
};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

const ORDERS_PATH: &str = "/v2/checkout/orders";

/// Orders resource
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    http: &'a HttpClient,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn order_path(id: &str) -> String {
        format!("{}/{}", ORDERS_PATH, segment(id))
    }

    #[instrument(skip(self, params), fields(intent = ?params.intent))]
    pub async fn create(&self, params: &CreateOrderParams) -> PayPalResult<Order> {
        let order: Order = self.http.post(ORDERS_PATH, params).await?;
        info!("Created PayPal order: {}", order.id);
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, id: &str) -> PayPalResult<Order> {
        self.http.get(&Self::order_path(id)).await
    }

    /// Apply JSON Patch operations to a created or approved order
    #[instrument(skip(self, operations))]
    pub async fn update(&self, id: &str, operations: &[PatchOperation]) -> PayPalResult<()> {
        let _: IgnoredAny = self.http.patch(&Self::order_path(id), operations).await?;
        Ok(())
    }

    /// Authorize payment for an approved order (intent `AUTHORIZE`)
    #[instrument(skip(self, params))]
    pub async fn authorize(
        &self,
        id: &str,
        params: Option<&OrderActionParams>,
    ) -> PayPalResult<Order> {
        let path = format!("{}/authorize", Self::order_path(id));
        let order: Order = match params {
            Some(params) => self.http.post(&path, params).await?,
            None => self.http.post_empty(&path).await?,
        };
        info!("Authorized PayPal order: {}", order.id);
        Ok(order)
    }

    /// Capture payment for an approved order (intent `CAPTURE`)
    #[instrument(skip(self, params))]
    pub async fn capture(
        &self,
        id: &str,
        params: Option<&OrderActionParams>,
    ) -> PayPalResult<Order> {
        let path = format!("{}/capture", Self::order_path(id));
        let order: Order = match params {
            Some(params) => self.http.post(&path, params).await?,
            None => self.http.post_empty(&path).await?,
        };
        info!("Captured PayPal order: {}", order.id);
        Ok(order)
    }

    #[instrument(skip(self, params))]
    pub async fn confirm_payment_source(
        &self,
        id: &str,
        params: &ConfirmPaymentSourceParams,
    ) -> PayPalResult<Order> {
        let path = format!("{}/confirm-payment-source", Self::order_path(id));
        self.http.post(&path, params).await
    }
}
