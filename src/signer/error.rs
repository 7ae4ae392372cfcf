use thiserror::Error;

/// Error types for request signing
///
/// Signing only fails on bad key material or a payload that cannot be
/// encoded; a payload that already carries a `signature` is a caller bug
/// and panics instead (see [`crate::signer::Signer::sign`]).
#[derive(Error, Debug)]
pub enum SignerError {
    /// No signing key was configured for this client
    ///
    /// Raised when a signed endpoint (withdraw, cheque creation, NFT
    /// transfer, exchange order) is called on a client built without a
    /// private key.
    #[error("No signing key configured; signed endpoints require a private key")]
    MissingKey,

    /// The private key has the wrong length for Ed25519
    #[error("Invalid Ed25519 private key length: expected 32 bytes, got {actual}")]
    InvalidKeyLength { actual: usize },

    /// Hex string parsing and decoding errors
    ///
    /// Raised when a private key supplied as hex contains invalid
    /// characters or has odd length.
    #[error("Hex parsing failed: {0}")]
    HexParse(#[from] hex::FromHexError),

    /// The payload could not be encoded to canonical JSON
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SignerError {
    /// Returns true if this error is about the key material rather than the payload
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            SignerError::MissingKey | SignerError::InvalidKeyLength { .. } | SignerError::HexParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_error_variant() {
        let error = SignerError::MissingKey;

        let formatted = format!("{}", error);
        assert!(formatted.contains("No signing key configured"));
        assert!(error.is_key_error());
        assert!(std::error::Error::source(&error).is_none());
    }

    #[test]
    fn test_invalid_key_length_error_variant() {
        let error = SignerError::InvalidKeyLength { actual: 31 };

        assert_eq!(
            format!("{}", error),
            "Invalid Ed25519 private key length: expected 32 bytes, got 31"
        );
        let debug_formatted = format!("{:?}", error);
        assert!(debug_formatted.contains("InvalidKeyLength"));
        assert!(debug_formatted.contains("31"));
    }

    #[test]
    fn test_hex_parse_error_conversion() {
        let hex_error = hex::decode("zz").unwrap_err();
        let error: SignerError = hex_error.into();

        assert!(format!("{}", error).starts_with("Hex parsing failed:"));
        assert!(error.is_key_error());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_serialization_error_is_not_key_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error = SignerError::from(json_error);

        assert!(format!("{}", error).starts_with("JSON serialization failed:"));
        assert!(!error.is_key_error());
    }
}
