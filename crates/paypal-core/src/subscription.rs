//! # Subscription Types
//!
//! Billing subscriptions (`/v1/billing/subscriptions`).

use crate::common::{Address, Link, Money, Name};
use crate::order::{ApplicationContext, PaymentSource};
use crate::plan::{BillingCycle, PaymentPreferences, Taxes};
use serde::{Deserialize, Serialize};

/// Reason sent when a cancellation does not give one
pub const DEFAULT_CANCEL_REASON: &str = "User requested cancellation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    ApprovalPending,
    Approved,
    Active,
    Suspended,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<PaymentSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleExecution {
    pub tenure_type: String,
    pub sequence: u32,
    pub cycles_completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cycles: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outstanding_balance: Option<Money>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle_executions: Vec<CycleExecution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment: Option<LastPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_billing_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_payment_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_payments_count: Option<u32>,
}

/// A billing subscription as returned by PayPal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Subscriber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_info: Option<BillingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_overridden: Option<bool>,
    #[serde(default)]
    pub links: Vec<Link>,
}

// =============================================================================
// Request types
// =============================================================================

/// Per-subscription overrides of the plan's cycles and preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOverride {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub billing_cycles: Vec<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_preferences: Option<PaymentPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Taxes>,
}

/// Body of `POST /v1/billing/subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscriptionParams {
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Subscriber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanOverride>,
}

impl CreateSubscriptionParams {
    pub fn new(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            start_time: None,
            quantity: None,
            shipping_amount: None,
            subscriber: None,
            application_context: None,
            plan: None,
        }
    }
}

/// Body of `POST /v1/billing/subscriptions/{id}/revise`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseSubscriptionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
}

/// Response of the revise call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseSubscriptionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_overridden: Option<bool>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Query for `GET /v1/billing/subscriptions`; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListSubscriptionsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Body of the cancel/suspend/activate transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeReason {
    pub reason: String,
}

/// Body of `POST /v1/billing/subscriptions/{id}/capture`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSubscriptionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// `OUTSTANDING_BALANCE` is the only value PayPal accepts today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

/// Query for `GET /v1/billing/subscriptions/{id}/transactions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionsQuery {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountWithBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<Money>,
}

/// One payment made against a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTransaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_with_breakdown: Option<AmountWithBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}
