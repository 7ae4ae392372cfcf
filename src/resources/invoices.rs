use crate::client::{ApiClient, ApiResponse};
use crate::model::InvoiceCreateRequest;

/// `invoice.*` operations
#[derive(Debug, Clone, Copy)]
pub struct Invoices<'a> {
    client: &'a ApiClient,
}

impl<'a> Invoices<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &InvoiceCreateRequest) -> ApiResponse {
        self.client.post_json("invoice.create", request).await
    }

    pub async fn status(&self, invoice_id: &str) -> ApiResponse {
        self.client
            .post_query("invoice.status", &[("invoice_id", invoice_id)])
            .await
    }

    pub async fn list(&self) -> ApiResponse {
        self.client.post_empty("invoice.list").await
    }
}
