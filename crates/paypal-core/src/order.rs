//! # Order Types
//!
//! Checkout order records (`/v2/checkout/orders`).

use crate::common::{find_link, Address, Link, Money, Name, Payer, Phone, TaxInfo};
use crate::payment::{Authorization, Capture, Refund};
use serde::{Deserialize, Serialize};

/// Whether the order captures immediately or only authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderIntent {
    Capture,
    Authorize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Saved,
    Approved,
    Voided,
    Completed,
    PayerActionRequired,
    #[serde(other)]
    Unknown,
}

/// A checkout order as returned by PayPal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<OrderIntent>,

    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,

    #[serde(default)]
    pub links: Vec<Link>,
}

impl Order {
    /// URL the buyer must visit to approve the order
    pub fn approve_url(&self) -> Option<&str> {
        find_link(&self.links, "approve")
            .or_else(|| find_link(&self.links, "payer-action"))
            .map(|l| l.href.as_str())
    }

    /// All captures across purchase units
    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.purchase_units
            .iter()
            .filter_map(|pu| pu.payments.as_ref())
            .flat_map(|p| p.captures.iter())
    }

    /// All authorizations across purchase units
    pub fn authorizations(&self) -> impl Iterator<Item = &Authorization> {
        self.purchase_units
            .iter()
            .filter_map(|pu| pu.payments.as_ref())
            .flat_map(|p| p.authorizations.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Payee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_instruction: Option<PaymentInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentCollection>,
}

impl PurchaseUnit {
    /// Purchase unit with only an amount
    pub fn new(amount: Amount) -> Self {
        Self {
            reference_id: None,
            amount,
            payee: None,
            payment_instruction: None,
            description: None,
            custom_id: None,
            invoice_id: None,
            soft_descriptor: None,
            items: Vec::new(),
            shipping: None,
            payments: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<AmountBreakdown>,
}

impl Amount {
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            value: value.into(),
            breakdown: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_discount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisbursementMode {
    Instant,
    Delayed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFee {
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Payee>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_fees: Vec<PlatformFee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement_mode: Option<DisbursementMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    DigitalGoods,
    PhysicalGoods,
    Donation,
}

/// A line item in a purchase unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub unit_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Money>,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Payments already made against a purchase unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentCollection {
    #[serde(default)]
    pub authorizations: Vec<Authorization>,
    #[serde(default)]
    pub captures: Vec<Capture>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
}

// =============================================================================
// Payment sources
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,
    /// `YYYY-MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPalWallet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_info: Option<TaxInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Funding instrument attached to an order or subscriber
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal: Option<PayPalWallet>,
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandingPage {
    Login,
    GuestCheckout,
    NoPreference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    Continue,
    PayNow,
    SubscribeNow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayeePreferred {
    Unrestricted,
    ImmediatePaymentRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_preferred: Option<PayeePreferred>,
}

/// Buyer experience settings for the approval flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<LandingPage>,
    /// `GET_FROM_FILE`, `NO_SHIPPING` or `SET_PROVIDED_ADDRESS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_action: Option<UserAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// Body of `POST /v2/checkout/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderParams {
    pub intent: OrderIntent,
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
}

impl CreateOrderParams {
    pub fn new(intent: OrderIntent, purchase_units: Vec<PurchaseUnit>) -> Self {
        Self {
            intent,
            purchase_units,
            payer: None,
            application_context: None,
        }
    }

    /// Builder: set the application context
    pub fn with_application_context(mut self, context: ApplicationContext) -> Self {
        self.application_context = Some(context);
        self
    }
}

/// Optional body for order authorize/capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderActionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<PaymentSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
}

/// Body of `POST /v2/checkout/orders/{id}/confirm-payment-source`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPaymentSourceParams {
    pub payment_source: PaymentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
}
