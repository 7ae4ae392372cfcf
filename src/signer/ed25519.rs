use std::fmt;

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use serde_json::Value;

use super::canonical::to_canonical_string;
use super::error::SignerError;
use super::{generate_query_id, Signer, QUERY_ID_FIELD, SIGNATURE_FIELD};
use crate::model::Payload;

/// Ed25519 request signer backed by a raw 32-byte private key
///
/// The key is zeroized on drop and never appears in `Debug` output.
#[derive(Clone)]
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from raw private key bytes
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidKeyLength`] unless `key_bytes` is exactly
    /// 32 bytes long.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, SignerError> {
        let key_array: [u8; SECRET_KEY_LENGTH] =
            key_bytes
                .try_into()
                .map_err(|_| SignerError::InvalidKeyLength {
                    actual: key_bytes.len(),
                })?;

        Ok(Self {
            key: SigningKey::from_bytes(&key_array),
        })
    }

    /// Creates a signer from a hex-encoded private key
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::HexParse`] for malformed hex and
    /// [`SignerError::InvalidKeyLength`] for a key of the wrong size.
    pub fn from_hex(key_hex: &str) -> Result<Self, SignerError> {
        let bytes = zeroize::Zeroizing::new(hex::decode(key_hex.trim())?);
        Self::from_bytes(&bytes)
    }

    /// Public half of the key, for server-side registration or verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("verifying_key", &self.verifying_key_hex())
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, mut payload: Payload) -> Result<Payload, SignerError> {
        assert!(
            !payload.contains_key(SIGNATURE_FIELD),
            "payload already contains a `{SIGNATURE_FIELD}` field"
        );

        if !payload.contains_key(QUERY_ID_FIELD) {
            let query_id = generate_query_id();
            tracing::debug!(query_id, "Generated query_id for signed payload");
            payload.insert(QUERY_ID_FIELD.to_string(), Value::from(query_id));
        }

        let canonical = to_canonical_string(&payload)?;
        let signature = self.key.sign(canonical.as_bytes());
        payload.insert(
            SIGNATURE_FIELD.to_string(),
            Value::String(hex::encode(signature.to_bytes())),
        );

        Ok(payload)
    }

    fn verifying_key_hex(&self) -> String {
        hex::encode(self.verifying_key().as_bytes())
    }
}

/// Checks the `signature` of a signed payload against `verifying_key`
///
/// Returns `Ok(false)` when the signature is missing, malformed, or does not
/// match the canonical encoding of the remaining fields.
///
/// # Errors
///
/// Returns [`SignerError::Serialization`] if the payload cannot be encoded.
pub fn verify_payload(payload: &Payload, verifying_key: &VerifyingKey) -> Result<bool, SignerError> {
    let Some(signature_hex) = payload.get(SIGNATURE_FIELD).and_then(Value::as_str) else {
        return Ok(false);
    };
    let Ok(signature_bytes) = hex::decode(signature_hex) else {
        return Ok(false);
    };
    let Ok(signature_array) = <[u8; 64]>::try_from(signature_bytes.as_slice()) else {
        return Ok(false);
    };

    let mut unsigned = payload.clone();
    unsigned.shift_remove(SIGNATURE_FIELD);
    let canonical = to_canonical_string(&unsigned)?;

    Ok(verifying_key
        .verify(canonical.as_bytes(), &Signature::from_bytes(&signature_array))
        .is_ok())
}
