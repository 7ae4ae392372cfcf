use crate::client::{ApiClient, ApiResponse};
use crate::model::NftTransferRequest;

/// `nft.*` operations
#[derive(Debug, Clone, Copy)]
pub struct Nft<'a> {
    client: &'a ApiClient,
}

impl<'a> Nft<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// NFTs held by this account
    pub async fn list(&self) -> ApiResponse {
        self.client.post_empty("nft.list").await
    }

    /// Transfers an NFT to another address (signed)
    pub async fn transfer(&self, nft_address: &str, to_address: &str) -> ApiResponse {
        let request = NftTransferRequest {
            nft_address: nft_address.to_string(),
            to_address: to_address.to_string(),
        };
        self.client.post_signed("nft.transfer", &request).await
    }
}
