//! Endpoint groups of the xJet API
//!
//! Each wrapper borrows an [`ApiClient`](crate::ApiClient) and maps its
//! arguments onto one operation. Methods marked *signed* need a client
//! constructed with a private key; without one they return
//! [`CallError::Signing`](crate::CallError::Signing).

pub mod account;
pub mod cheques;
pub mod exchanges;
pub mod invoices;
pub mod nft;
pub mod system;

pub use account::Account;
pub use cheques::Cheques;
pub use exchanges::Exchanges;
pub use invoices::Invoices;
pub use nft::Nft;
pub use system::System;
