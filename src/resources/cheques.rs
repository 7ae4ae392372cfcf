use crate::client::{ApiClient, ApiResponse};
use crate::model::{ChequeCreateRequest, ChequeIdRequest};

/// `cheque.*` operations
#[derive(Debug, Clone, Copy)]
pub struct Cheques<'a> {
    client: &'a ApiClient,
}

impl<'a> Cheques<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Creates a cheque (signed)
    pub async fn create(&self, request: &ChequeCreateRequest) -> ApiResponse {
        self.client.post_signed("cheque.create", request).await
    }

    pub async fn status(&self, cheque_id: &str) -> ApiResponse {
        self.client
            .post_query("cheque.status", &[("cheque_id", cheque_id)])
            .await
    }

    /// Cheques issued by this account
    pub async fn list(&self) -> ApiResponse {
        self.client.post_empty("cheque.list").await
    }

    pub async fn cancel(&self, cheque_id: &str) -> ApiResponse {
        let request = ChequeIdRequest {
            cheque_id: cheque_id.to_string(),
        };
        self.client.post_json("cheque.cancel", &request).await
    }
}
