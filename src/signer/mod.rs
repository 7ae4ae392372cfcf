//! # Signer Module
//!
//! Authentication of mutating requests. A signed request body is the
//! original payload plus two fields appended in this order:
//!
//! - `query_id`: freshness token, `(unix_seconds + 60) << 16`
//! - `signature`: lowercase hex Ed25519 signature over the canonical JSON
//!   encoding of the payload *including* `query_id` and *excluding*
//!   `signature` itself
//!
//! The low 16 bits of `query_id` are reserved by the wire format and are
//! always zero. A caller-supplied `query_id` is kept verbatim, which makes
//! signing fully deterministic:
//!
//! ```rust,no_run
//! use serde_json::json;
//! use xjet_rs::signer::{Ed25519Signer, Signer, SignerError};
//!
//! fn example() -> Result<(), SignerError> {
//!     let signer = Ed25519Signer::from_hex(
//!         "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
//!     )?;
//!     let payload = json!({"nft_address": "EQnft", "to_address": "EQdest", "query_id": 42})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default();
//!     let signed = signer.sign(payload)?;
//!     assert_eq!(signed["query_id"], 42);
//!     Ok(())
//! }
//! ```

pub mod canonical;
pub mod ed25519;
pub mod error;

pub use canonical::to_canonical_string;
pub use ed25519::{verify_payload, Ed25519Signer};
pub use error::SignerError;

use chrono::Utc;

use crate::model::Payload;

/// Name of the freshness token field
pub const QUERY_ID_FIELD: &str = "query_id";

/// Name of the signature field
pub const SIGNATURE_FIELD: &str = "signature";

/// Forward skew added to the current time when generating a `query_id`
pub const QUERY_ID_SKEW_SECONDS: i64 = 60;

/// Number of low-order bits of `query_id` reserved by the wire format
pub const QUERY_ID_RESERVED_BITS: u32 = 16;

/// Request body signing
///
/// Implementations must be thread-safe (Send + Sync): one signer is shared
/// by every concurrent call of a client.
pub trait Signer: Send + Sync + std::fmt::Debug {
    /// Augments `payload` with `query_id` (unless already present) and
    /// `signature`
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::Serialization`] if the payload cannot be encoded.
    ///
    /// # Panics
    ///
    /// Panics if `payload` already contains a `signature` field. Signing an
    /// already-signed body is a programming error.
    fn sign(&self, payload: Payload) -> Result<Payload, SignerError>;

    /// Hex encoding of the public half of the signing key
    fn verifying_key_hex(&self) -> String;
}

/// Builds the freshness token for a given unix time
pub fn query_id_at(unix_seconds: i64) -> u64 {
    ((unix_seconds + QUERY_ID_SKEW_SECONDS) as u64) << QUERY_ID_RESERVED_BITS
}

/// Builds the freshness token for the current time
pub fn generate_query_id() -> u64 {
    query_id_at(Utc::now().timestamp())
}

/// Recovers the unix time a generated `query_id` is valid until
pub fn query_id_deadline(query_id: u64) -> i64 {
    (query_id >> QUERY_ID_RESERVED_BITS) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_id_layout() {
        let query_id = query_id_at(1_700_000_000);
        assert_eq!(query_id, 1_700_000_060u64 << 16);
        assert_eq!(query_id & 0xffff, 0);
        assert_eq!(query_id_deadline(query_id), 1_700_000_060);
    }

    #[test]
    fn test_generated_query_id_tracks_clock() {
        let before = Utc::now().timestamp();
        let query_id = generate_query_id();
        let after = Utc::now().timestamp();

        let deadline = query_id_deadline(query_id);
        assert!(deadline >= before + QUERY_ID_SKEW_SECONDS);
        assert!(deadline <= after + QUERY_ID_SKEW_SECONDS);
        assert_eq!(query_id & 0xffff, 0);
    }
}
