//! Inbound Splynx webhook handling: signature verification and payload
//! normalization.
//!
//! Splynx has shipped several webhook payload shapes across integration
//! versions; [`normalize_attributes`] flattens all of them into one map of
//! payment attributes so the handler only deals with a single shape.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::SplynxConfig;

type HmacSha256 = Hmac<Sha256>;

/// Fields a payment webhook must carry to be processed.
pub const REQUIRED_FIELDS: [&str; 2] = ["client_id", "amount"];

/// Prefix for synthesized transaction ids.
const TRANSACTION_ID_PREFIX: &str = "SPX";

/// Verifies the `x-splynx-signature` header: lowercase hex HMAC-SHA256 of
/// the raw request body under the shared secret.
#[derive(Debug, Clone)]
pub struct SplynxWebhookVerifier {
    webhook_secret: String,
}

impl SplynxWebhookVerifier {
    pub fn new(config: &SplynxConfig) -> Self {
        Self {
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    /// Verify a signature against the raw payload.
    ///
    /// The byte comparison is constant-time so response timing does not
    /// distinguish near-miss signatures from far-off ones. The length check
    /// is not constant-time; signature length is not secret (always 64 hex
    /// chars for SHA-256).
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.webhook_secret.as_bytes()) else {
            return false;
        };
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();

        if expected_bytes.len() != provided_bytes.len() {
            return false;
        }

        expected_bytes.ct_eq(provided_bytes).into()
    }
}

/// Flatten a webhook body into one payment-attributes map.
///
/// Three shapes are accepted:
/// - JSON-API style `{"data": {"attributes": {...}}}`
/// - `{"payment": {...}}` envelope
/// - a bare flat object
///
/// Anything else (including non-objects) is treated as the bare case and
/// yields an empty map, which the handler reads as a liveness ping. A
/// `customer_id` field is copied into `client_id` when the latter is absent
/// (older Splynx integrations send `customer_id`).
pub fn normalize_attributes(body: &Value) -> Map<String, Value> {
    let mut attrs = if let Some(attributes) = body
        .get("data")
        .and_then(|d| d.get("attributes"))
        .and_then(Value::as_object)
    {
        attributes.clone()
    } else if let Some(payment) = body.get("payment").and_then(Value::as_object) {
        payment.clone()
    } else if let Some(flat) = body.as_object() {
        flat.clone()
    } else {
        Map::new()
    };

    if !attrs.contains_key("client_id") {
        if let Some(customer_id) = attrs.get("customer_id").cloned() {
            attrs.insert("client_id".to_string(), customer_id);
        }
    }

    attrs
}

/// Names of required fields absent from the attributes.
pub fn missing_required_fields(attrs: &Map<String, Value>) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            attrs
                .get(**field)
                .map(|v| v.is_null())
                .unwrap_or(true)
        })
        .map(|field| field.to_string())
        .collect()
}

/// Heuristic for monitoring probes: a tiny payload that is missing required
/// fields is answered with 200 instead of a validation error, so health
/// checks from the provider side do not show up as failures.
///
/// Fragile by nature (an actual malformed payment with under three keys is
/// silently dropped); kept as one named predicate so the threshold lives in
/// a single place.
pub fn looks_like_test_probe(attrs: &Map<String, Value>) -> bool {
    attrs.len() < 3
}

/// Build a transaction id for payloads that did not carry one.
///
/// Unique across distinct (client, millisecond) pairs; not cryptographic.
pub fn synthesize_transaction_id(client_id: i64) -> String {
    format!(
        "{}-{}-{}",
        TRANSACTION_ID_PREFIX,
        Utc::now().timestamp_millis(),
        client_id
    )
}

/// Read a value as an integer, accepting JSON numbers and numeric strings.
/// Splynx sends ids both ways depending on the integration version.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a value as a float, accepting JSON numbers and numeric strings.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a value as a string, stringifying numbers.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
