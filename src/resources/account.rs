use crate::client::{ApiClient, ApiResponse};
use crate::model::{Amount, OperationsRequest, WithdrawRequest};

/// `account.*` operations
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    client: &'a ApiClient,
}

impl<'a> Account<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Information about the API application
    pub async fn me(&self) -> ApiResponse {
        self.client.post_empty("account.me").await
    }

    /// Balances of every currency
    pub async fn balance(&self) -> ApiResponse {
        self.client.post_empty("account.balances").await
    }

    /// Asks the platform to look for incoming deposits
    pub async fn submit_deposit(&self) -> ApiResponse {
        self.client.post_empty("account.submitDeposit").await
    }

    /// Withdraws funds to a TON address (signed)
    pub async fn withdraw(
        &self,
        ton_address: &str,
        currency: &str,
        amount: impl Into<Amount>,
    ) -> ApiResponse {
        let request = WithdrawRequest {
            ton_address: ton_address.to_string(),
            currency: currency.to_string(),
            amount: amount.into(),
        };
        self.client.post_signed("account.withdraw", &request).await
    }

    /// Operation history, newest first
    pub async fn operations(&self, limit: u32, offset: u32) -> ApiResponse {
        self.client
            .post_json("account.operations", &OperationsRequest { limit, offset })
            .await
    }

    /// The first page of operation history (100 entries)
    pub async fn recent_operations(&self) -> ApiResponse {
        self.client
            .post_json("account.operations", &OperationsRequest::default())
            .await
    }
}
