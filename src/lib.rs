//! # xJet Client Library
//!
//! A Rust client for the xJet API: account, cheque, invoice, NFT and
//! exchange operations, with Ed25519 signing of the requests that move
//! funds.
//!
//! ## Modules
//!
//! - [`client`] - Transport, retry layer and the [`ApiClient`] façade
//! - [`resources`] - Endpoint groups (`client.account()`, `client.cheques()`, ...)
//! - [`model`] - Credentials, environments and typed request bodies
//! - [`signer`] - Canonical JSON encoding and request signing
//! - [`client_trait`] - The [`Dispatcher`] seam between transport and network
//! - [`mock_client`] - Scripted dispatcher for tests
//! - [`mocks`] - httpmock fixtures for the platform endpoints
//!
//! ## Error Model
//!
//! Constructors fail with [`Error`] on bad configuration. Every API call
//! returns [`ApiResponse`]: `Ok` with the decoded JSON body, or a
//! [`CallError`] value for platform-reported errors, transport failures and
//! unreadable responses alike. Calls never panic on remote failures.
//!
//! ## Concurrency
//!
//! [`ApiClient`] is cheap to clone and safe to share between tasks. Calls
//! are independent: no ordering is enforced between concurrent requests, so
//! callers that need two withdrawals applied in order must await the first
//! before sending the second.

pub mod client;
pub mod client_trait;
pub mod mock_client;
pub mod mocks;
pub mod model;
pub mod resources;
pub mod signer;

pub use client::{ApiClient, ApiResponse, CallError, Error, RetryConfig, Transport};
pub use client_trait::{Dispatcher, OutboundRequest, RawResponse};
pub use mock_client::MockDispatcher;
pub use model::{Amount, Credentials, Environment, OrderSide, Payload};
pub use signer::{Ed25519Signer, Signer, SignerError};
