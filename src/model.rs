use std::fmt;
use std::str::FromStr;

use secrecy::{Secret, SecretVec};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::client::Error;
use crate::signer::SignerError;

/// Request body before signing; keys keep their insertion order
pub type Payload = serde_json::Map<String, Value>;

/// Deployment target of the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Test,
    Local,
}

impl Environment {
    /// Base endpoint every operation name is appended to
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => "https://xjet.app/api/v1",
            Environment::Test => "https://testnet.xjet.app/api/v1",
            Environment::Local => "https://127.0.0.1:5000/api/v1",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "mainnet",
            Environment::Test => "testnet",
            Environment::Local => "localnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "production" => Ok(Environment::Production),
            "testnet" | "test" => Ok(Environment::Test),
            "localnet" | "local" => Ok(Environment::Local),
            other => Err(Error::UnknownEnvironment(other.to_string())),
        }
    }
}

/// API key and optional Ed25519 private key of one client
///
/// Both values are held in [`secrecy`] wrappers: they are redacted from
/// `Debug` output and zeroized on drop.
pub struct Credentials {
    pub api_key: Secret<String>,
    pub signing_key: Option<SecretVec<u8>>,
}

impl Credentials {
    /// Credentials from an API key and raw private key bytes
    ///
    /// Key material is validated when the client is constructed.
    pub fn new(api_key: impl Into<String>, signing_key: Option<Vec<u8>>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            signing_key: signing_key.map(Secret::new),
        }
    }

    /// Credentials for unsigned endpoints only
    pub fn api_key_only(api_key: impl Into<String>) -> Self {
        Self::new(api_key, None)
    }

    /// Credentials from an API key and a hex-encoded private key
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSigningKey`] if `private_key_hex` is not valid hex.
    pub fn from_hex(api_key: impl Into<String>, private_key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(private_key_hex.trim()).map_err(SignerError::from)?;
        Ok(Self::new(api_key, Some(bytes)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("has_signing_key", &self.signing_key.is_some())
            .finish_non_exhaustive()
    }
}

/// Numeric amount, serialized as a JSON integer or float as given
///
/// Non-finite decimals fail to serialize instead of becoming `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Integer(i64),
    Decimal(f64),
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Amount::Integer(value) => serializer.serialize_i64(value),
            Amount::Decimal(value) if value.is_finite() => serializer.serialize_f64(value),
            Amount::Decimal(value) => Err(serde::ser::Error::custom(format!(
                "amount must be a finite number, got {value}"
            ))),
        }
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Integer(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Integer(value.into())
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::Integer(value.into())
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Decimal(value)
    }
}

/// Direction of an exchange order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

// Field declaration order below is the wire order, and for signed requests
// the order the signature is computed over.

/// Body of `account.withdraw` (signed)
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub ton_address: String,
    pub currency: String,
    pub amount: Amount,
}

/// Body of `account.operations`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationsRequest {
    pub limit: u32,
    pub offset: u32,
}

impl Default for OperationsRequest {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

/// Keys of `cheque.create` that [`ChequeCreateRequest::with_extra`] will not set
pub const CHEQUE_RESERVED_KEYS: [&str; 9] = [
    "currency",
    "amount",
    "expires",
    "description",
    "activates_count",
    "groups_id",
    "personal_id",
    "password",
    crate::signer::SIGNATURE_FIELD,
];

/// Body of `cheque.create` (signed)
///
/// Unset optional fields are sent as `null`. Entries in `extra` are
/// appended after the documented fields in their insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct ChequeCreateRequest {
    pub currency: String,
    pub amount: Amount,
    pub expires: Option<i64>,
    pub description: String,
    pub activates_count: u32,
    pub groups_id: Option<Vec<i64>>,
    pub personal_id: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: Payload,
}

impl ChequeCreateRequest {
    pub fn new(currency: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            currency: currency.into(),
            amount: amount.into(),
            expires: None,
            description: String::new(),
            activates_count: 1,
            groups_id: None,
            personal_id: None,
            password: None,
            extra: Payload::new(),
        }
    }

    pub fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_activates_count(mut self, activates_count: u32) -> Self {
        self.activates_count = activates_count;
        self
    }

    pub fn with_groups(mut self, groups_id: Vec<i64>) -> Self {
        self.groups_id = Some(groups_id);
        self
    }

    pub fn with_personal_id(mut self, personal_id: impl Into<String>) -> Self {
        self.personal_id = Some(personal_id.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Adds a field not covered by the typed setters
    ///
    /// Documented field names and `signature` are ignored; use the typed
    /// setters for the former.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if CHEQUE_RESERVED_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Ignoring extra cheque field that shadows a reserved key");
            return self;
        }
        self.extra.insert(key, value.into());
        self
    }
}

/// Body of `cheque.cancel`
#[derive(Debug, Clone, Serialize)]
pub struct ChequeIdRequest {
    pub cheque_id: String,
}

/// Body of `invoice.create`
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceCreateRequest {
    pub currency: String,
    pub amount: Amount,
    pub description: Option<String>,
    pub max_payments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

impl InvoiceCreateRequest {
    /// The platform expects invoice currencies in lowercase.
    pub fn new(currency: &str, amount: impl Into<Amount>) -> Self {
        Self {
            currency: currency.to_lowercase(),
            amount: amount.into(),
            description: None,
            max_payments: 1,
            expires: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_payments(mut self, max_payments: u32) -> Self {
        self.max_payments = max_payments;
        self
    }

    pub fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }
}

/// Body of `nft.transfer` (signed)
#[derive(Debug, Clone, Serialize)]
pub struct NftTransferRequest {
    pub nft_address: String,
    pub to_address: String,
}

/// Body of `exchanges.estimate`
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeEstimateRequest {
    pub pair: [String; 2],
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub amount: Amount,
}

/// Body of `exchanges.createOrder` (signed)
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeOrderRequest {
    pub pair: [String; 2],
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub amount: Amount,
    pub min_expected_amount: Amount,
}

/// Serializes a typed request into an ordered payload
///
/// # Errors
///
/// Returns an error if `request` does not serialize to a JSON object.
pub fn to_payload<T: Serialize>(request: &T) -> Result<Payload, serde_json::Error> {
    match serde_json::to_value(request)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "request must serialize to a JSON object, got {other}"
        ))),
    }
}
