use crate::client::{ApiClient, ApiResponse};

/// `system.*` operations
#[derive(Debug, Clone, Copy)]
pub struct System<'a> {
    client: &'a ApiClient,
}

impl<'a> System<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Currencies supported by the platform
    pub async fn currencies(&self) -> ApiResponse {
        self.client.post_empty("system.currencies").await
    }
}
