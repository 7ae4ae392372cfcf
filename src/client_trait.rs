//! Network seam of the transport layer
//!
//! [`crate::client::Transport`] builds an [`OutboundRequest`] and hands it to
//! a [`Dispatcher`]. The production [`crate::client::HttpDispatcher`] sends it
//! with reqwest; [`crate::mock_client::MockDispatcher`] answers from a script,
//! so response normalization can be tested without a network.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::client::CallError;
use crate::model::Payload;

/// A fully resolved request, ready to send
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    /// Always carries `X-API-Key`, marked sensitive
    pub headers: HeaderMap,
    pub body: Option<Payload>,
    pub query: Vec<(String, String)>,
}

/// Status and undecoded body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends requests on behalf of a transport
///
/// An `Err` means no usable response was obtained (connection failure,
/// timeout, unreadable body). Any HTTP status with a body is an `Ok`.
#[async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    async fn dispatch(&self, request: OutboundRequest) -> Result<RawResponse, CallError>;
}
