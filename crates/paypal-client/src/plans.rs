//! # Billing Plans API
//!
//! `/v1/billing/plans`

use crate::http::HttpClient;
use crate::path::{segment, with_query};
use paypal_core::{
    CreatePlanParams, ListPlansParams, ListResponse, PatchOperation, PayPalResult, Plan,
    UpdatePricingParams,
};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

const PLANS_PATH: &str = "/v1/billing/plans";

/// Billing plans resource
#[derive(Debug, Clone, Copy)]
pub struct Plans<'a> {
    http: &'a HttpClient,
}

impl<'a> Plans<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn plan_path(id: &str) -> String {
        format!("{}/{}", PLANS_PATH, segment(id))
    }

    async fn transition(&self, id: &str, action: &str) -> PayPalResult<()> {
        let path = format!("{}/{}", Self::plan_path(id), action);
        let _: IgnoredAny = self.http.post_empty(&path).await?;
        info!("PayPal plan {} {}", id, action);
        Ok(())
    }

    #[instrument(skip(self, params), fields(product_id = %params.product_id))]
    pub async fn create(&self, params: &CreatePlanParams) -> PayPalResult<Plan> {
        let plan: Plan = self.http.post(PLANS_PATH, params).await?;
        info!("Created PayPal plan: {}", plan.id);
        Ok(plan)
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, id: &str) -> PayPalResult<Plan> {
        self.http.get(&Self::plan_path(id)).await
    }

    /// List plans; only the supplied filters reach the query string
    #[instrument(skip(self))]
    pub async fn list(&self, params: &ListPlansParams) -> PayPalResult<ListResponse<Plan>> {
        self.http.get(&with_query(PLANS_PATH, params)?).await
    }

    #[instrument(skip(self, operations))]
    pub async fn update(&self, id: &str, operations: &[PatchOperation]) -> PayPalResult<()> {
        let _: IgnoredAny = self.http.patch(&Self::plan_path(id), operations).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: &str) -> PayPalResult<()> {
        self.transition(id, "activate").await
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: &str) -> PayPalResult<()> {
        self.transition(id, "deactivate").await
    }

    #[instrument(skip(self, params))]
    pub async fn update_pricing(&self, id: &str, params: &UpdatePricingParams) -> PayPalResult<()> {
        let path = format!("{}/update-pricing-schemes", Self::plan_path(id));
        let _: IgnoredAny = self.http.post(&path, params).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{client_for, mount_token};
    use paypal_core::{Money, PlanStatus, PricingScheme, PricingSchemeUpdate};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_sends_only_supplied_filters() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("GET"))
            .and(path("/v1/billing/plans"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plans": [
                    {"id": "P-1", "name": "Basic", "status": "ACTIVE"},
                    {"id": "P-2", "name": "Pro", "status": "INACTIVE"}
                ],
                "links": [{"href": "https://api.sandbox.paypal.com/v1/billing/plans?page=3", "rel": "next", "method": "GET"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let params = ListPlansParams {
            page: Some(2),
            ..Default::default()
        };
        let page = Plans::new(&http).list(&params).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.items[0].status, Some(PlanStatus::Active));
        assert!(page.next_link().is_some());

        let requests = server.received_requests().await.unwrap();
        let listed = requests
            .iter()
            .find(|r| r.url.path() == "/v1/billing/plans")
            .unwrap();
        assert_eq!(listed.url.query(), Some("page=2"));
    }

    #[tokio::test]
    async fn test_list_without_filters_has_no_query() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("GET"))
            .and(path("/v1/billing/plans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"plans": []})))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let page = Plans::new(&http).list(&ListPlansParams::default()).await.unwrap();
        assert!(page.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert!(requests
            .iter()
            .filter(|r| r.url.path() == "/v1/billing/plans")
            .all(|r| r.url.query().is_none()));
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        for action in ["activate", "deactivate"] {
            Mock::given(method("POST"))
                .and(path(format!("/v1/billing/plans/P-1/{action}")))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;
        }

        let http = client_for(&server);
        let plans = Plans::new(&http);
        plans.activate("P-1").await.unwrap();
        plans.deactivate("P-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_pricing() {
        let server = MockServer::start().await;
        mount_token(&server, "TOKEN").await;

        Mock::given(method("POST"))
            .and(path("/v1/billing/plans/P-1/update-pricing-schemes"))
            .and(body_json(json!({
                "pricing_schemes": [{
                    "billing_cycle_sequence": 1,
                    "pricing_scheme": {"fixed_price": {"currency_code": "USD", "value": "12.00"}}
                }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let http = client_for(&server);
        let params = UpdatePricingParams {
            pricing_schemes: vec![PricingSchemeUpdate {
                billing_cycle_sequence: 1,
                pricing_scheme: PricingScheme::fixed(Money::new("USD", "12.00")),
            }],
        };
        Plans::new(&http).update_pricing("P-1", &params).await.unwrap();
    }
}
