//! Scripted dispatcher for testing
//!
//! [`MockDispatcher`] stands in for the network: it records every request a
//! client sends and answers with queued replies, so transport normalization
//! and request construction can be checked without an HTTP server.
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use url::Url;
//! use xjet_rs::{ApiClient, Credentials, MockDispatcher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mock = MockDispatcher::new().with_json(json!({"balance": 100}));
//! let client = ApiClient::with_dispatcher(
//!     Credentials::api_key_only("key"),
//!     Url::parse("https://testnet.xjet.app/api/v1")?,
//!     Arc::new(mock.clone()),
//! )?;
//!
//! assert_eq!(client.account().balance().await?, json!({"balance": 100}));
//! assert_eq!(mock.last_request().unwrap().url.path(), "/api/v1/account.balances");
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::CallError;
use crate::client_trait::{Dispatcher, OutboundRequest, RawResponse};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A response with the given status and body
    Response(RawResponse),
    /// A failure before any response, e.g. connection refused
    Failure(String),
}

/// Dispatcher answering from a queue of scripted replies
///
/// Replies are consumed in order; once the queue is empty the fallback reply
/// is repeated, or a transport failure is returned if none was set.
#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    inner: Arc<MockDispatcherInner>,
}

#[derive(Debug, Default)]
struct MockDispatcherInner {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a `200` reply with a JSON body
    #[must_use]
    pub fn with_json(self, body: Value) -> Self {
        self.push_json(200, body);
        self
    }

    /// Queues a reply with a raw, possibly non-JSON, body
    #[must_use]
    pub fn with_raw(self, status: u16, body: impl Into<String>) -> Self {
        self.push(MockReply::Response(RawResponse {
            status,
            body: body.into(),
        }));
        self
    }

    /// Queues a transport failure
    #[must_use]
    pub fn with_failure(self, description: impl Into<String>) -> Self {
        self.push(MockReply::Failure(description.into()));
        self
    }

    /// Sets the reply used once the queue runs dry
    #[must_use]
    pub fn with_fallback_json(self, body: Value) -> Self {
        *lock(&self.inner.fallback) = Some(MockReply::Response(RawResponse {
            status: 200,
            body: body.to_string(),
        }));
        self
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(MockReply::Response(RawResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn push(&self, reply: MockReply) {
        lock(&self.inner.replies).push_back(reply);
    }

    /// Every request dispatched so far, oldest first
    pub fn requests(&self) -> Vec<OutboundRequest> {
        lock(&self.inner.requests).clone()
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        lock(&self.inner.requests).last().cloned()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.inner.requests).len()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn dispatch(&self, request: OutboundRequest) -> Result<RawResponse, CallError> {
        lock(&self.inner.requests).push(request);

        let reply = lock(&self.inner.replies)
            .pop_front()
            .or_else(|| lock(&self.inner.fallback).clone());

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(description)) => Err(CallError::Transport(description)),
            None => Err(CallError::Transport(
                "no mock reply configured".to_string(),
            )),
        }
    }
}
