//! # Billing Plan Types
//!
//! Billing plans (`/v1/billing/plans`) and the cycle/pricing records shared
//! with subscriptions.

use crate::common::{Link, Money};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Created,
    Inactive,
    Active,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub interval_unit: IntervalUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenureType {
    Regular,
    Trial,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl PricingScheme {
    pub fn fixed(price: Money) -> Self {
        Self {
            fixed_price: Some(price),
            create_time: None,
            update_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycle {
    pub frequency: Frequency,
    pub tenure_type: TenureType,
    pub sequence: u32,
    /// 0 means the cycle repeats until cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cycles: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_scheme: Option<PricingScheme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupFeeFailureAction {
    Continue,
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_bill_outstanding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee_failure_action: Option<SetupFeeFailureAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_failure_threshold: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxes {
    pub percentage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
}

/// A billing plan as returned by PayPal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
    #[serde(default)]
    pub billing_cycles: Vec<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_preferences: Option<PaymentPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Taxes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_supported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

// =============================================================================
// Request types
// =============================================================================

/// Body of `POST /v1/billing/plans`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlanParams {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
    pub billing_cycles: Vec<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_preferences: Option<PaymentPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Taxes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_supported: Option<bool>,
}

/// Query for `GET /v1/billing/plans`; unset fields are left out of the URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListPlansParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_required: Option<bool>,
}

/// New price for one billing cycle of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSchemeUpdate {
    pub billing_cycle_sequence: u32,
    pub pricing_scheme: PricingScheme,
}

/// Body of `POST /v1/billing/plans/{id}/update-pricing-schemes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePricingParams {
    pub pricing_schemes: Vec<PricingSchemeUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_billing_cycle_serialization() {
        let cycle = BillingCycle {
            frequency: Frequency {
                interval_unit: IntervalUnit::Month,
                interval_count: Some(1),
            },
            tenure_type: TenureType::Regular,
            sequence: 1,
            total_cycles: Some(0),
            pricing_scheme: Some(PricingScheme::fixed(Money::new("USD", "9.99"))),
        };

        assert_eq!(
            serde_json::to_value(&cycle).unwrap(),
            json!({
                "frequency": {"interval_unit": "MONTH", "interval_count": 1},
                "tenure_type": "REGULAR",
                "sequence": 1,
                "total_cycles": 0,
                "pricing_scheme": {"fixed_price": {"currency_code": "USD", "value": "9.99"}}
            })
        );
    }

    #[test]
    fn test_plan_deserialization() {
        let plan: Plan = serde_json::from_value(json!({
            "id": "P-5ML4271244454362WXNWU5NQ",
            "product_id": "PROD-XXCD1234QWER65782",
            "name": "Video Streaming Service Plan",
            "status": "ACTIVE",
            "billing_cycles": [],
            "create_time": "2020-02-26T07:01:04Z",
            "links": []
        }))
        .unwrap();
        assert_eq!(plan.status, Some(PlanStatus::Active));
        assert!(plan.billing_cycles.is_empty());
    }
}
