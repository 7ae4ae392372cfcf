use crate::client::{ApiClient, ApiResponse};
use crate::model::{Amount, ExchangeEstimateRequest, ExchangeOrderRequest, OrderSide};

/// `exchanges.*` operations
#[derive(Debug, Clone, Copy)]
pub struct Exchanges<'a> {
    client: &'a ApiClient,
}

impl<'a> Exchanges<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Tradable pairs; the only GET operation of the API
    pub async fn pairs(&self) -> ApiResponse {
        self.client.get("exchanges.pairs").await
    }

    /// Quotes an order without placing it
    pub async fn estimate(
        &self,
        pair: [&str; 2],
        side: OrderSide,
        amount: impl Into<Amount>,
    ) -> ApiResponse {
        let request = ExchangeEstimateRequest {
            pair: pair.map(str::to_string),
            side,
            amount: amount.into(),
        };
        self.client.post_json("exchanges.estimate", &request).await
    }

    /// Places an order that fails if it would fill below
    /// `min_expected_amount` (signed)
    pub async fn create_order(
        &self,
        pair: [&str; 2],
        side: OrderSide,
        amount: impl Into<Amount>,
        min_expected_amount: impl Into<Amount>,
    ) -> ApiResponse {
        let request = ExchangeOrderRequest {
            pair: pair.map(str::to_string),
            side,
            amount: amount.into(),
            min_expected_amount: min_expected_amount.into(),
        };
        self.client
            .post_signed("exchanges.createOrder", &request)
            .await
    }

    pub async fn order_status(&self, order_id: &str) -> ApiResponse {
        self.client
            .post_query("exchanges.orderStatus", &[("id", order_id)])
            .await
    }
}
