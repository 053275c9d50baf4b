//! Webhook signature verification and payload normalization tests

mod common;

use common::*;
use paysync::splynx::{
    self, looks_like_test_probe, missing_required_fields, normalize_attributes,
    synthesize_transaction_id,
};
use serde_json::json;

fn test_verifier() -> SplynxWebhookVerifier {
    SplynxWebhookVerifier::new(&SplynxConfig {
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
    })
}

// ============ Signature Verification Tests ============

#[test]
fn test_valid_signature_accepted() {
    let verifier = test_verifier();
    let payload = b"{\"client_id\":1,\"amount\":100}";
    let signature = sign_body(payload);

    assert!(
        verifier.verify(payload, &signature),
        "Valid signature should be accepted"
    );
}

#[test]
fn test_wrong_secret_rejected() {
    let verifier = test_verifier();
    let payload = b"{\"client_id\":1,\"amount\":100}";

    // Signature computed with a different secret
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    let mut mac = Hmac::<Sha256>::new_from_slice(b"wrong_secret").unwrap();
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());

    assert!(
        !verifier.verify(payload, &signature),
        "Signature under the wrong secret should be rejected"
    );
}

#[test]
fn test_modified_payload_rejected() {
    let verifier = test_verifier();
    let original = b"{\"client_id\":1,\"amount\":100}";
    let modified = b"{\"client_id\":1,\"amount\":999}";
    let signature = sign_body(original);

    assert!(
        !verifier.verify(modified, &signature),
        "Modified payload should be rejected"
    );
}

#[test]
fn test_empty_signature_rejected() {
    let verifier = test_verifier();
    assert!(!verifier.verify(b"{}", ""));
}

#[test]
fn test_non_hex_signature_rejected() {
    let verifier = test_verifier();
    assert!(!verifier.verify(b"{}", "not-a-valid-hex-signature"));
}

#[test]
fn test_same_length_wrong_signature_rejected() {
    let verifier = test_verifier();
    // 64 hex chars, same length as a real SHA-256 signature
    let fake = "a".repeat(64);
    assert!(!verifier.verify(b"{}", &fake));
}

#[test]
fn test_binary_payload() {
    let verifier = test_verifier();
    let payload = &[0x00, 0x01, 0x02, 0xFF, 0xFE, 0xFD];
    let signature = sign_body(payload);

    assert!(verifier.verify(payload, &signature));
}

// ============ Payload Normalization Tests ============

#[test]
fn test_all_three_shapes_normalize_identically() {
    let json_api = json!({
        "data": { "attributes": { "client_id": 42, "amount": 150.5, "payment_type": "online" } }
    });
    let envelope = json!({
        "payment": { "client_id": 42, "amount": 150.5, "payment_type": "online" }
    });
    let bare = json!({ "client_id": 42, "amount": 150.5, "payment_type": "online" });

    let a = normalize_attributes(&json_api);
    let b = normalize_attributes(&envelope);
    let c = normalize_attributes(&bare);

    assert_eq!(a, b, "data.attributes and payment envelope should match");
    assert_eq!(b, c, "payment envelope and bare object should match");
    assert_eq!(a.get("client_id"), Some(&json!(42)));
    assert_eq!(a.get("amount"), Some(&json!(150.5)));
}

#[test]
fn test_unknown_shape_treated_as_bare() {
    let body = json!({ "event": "something", "client_id": 3 });
    let attrs = normalize_attributes(&body);
    assert_eq!(attrs.get("client_id"), Some(&json!(3)));
    assert_eq!(attrs.len(), 2);
}

#[test]
fn test_non_object_body_normalizes_to_empty() {
    assert!(normalize_attributes(&json!(null)).is_empty());
    assert!(normalize_attributes(&json!([1, 2, 3])).is_empty());
    assert!(normalize_attributes(&json!("ping")).is_empty());
}

#[test]
fn test_customer_id_aliased_into_client_id() {
    let attrs = normalize_attributes(&json!({ "customer_id": 7, "amount": 10 }));
    assert_eq!(attrs.get("client_id"), Some(&json!(7)));
    // Original field is kept alongside the alias
    assert_eq!(attrs.get("customer_id"), Some(&json!(7)));
}

#[test]
fn test_customer_id_does_not_override_client_id() {
    let attrs = normalize_attributes(&json!({ "client_id": 1, "customer_id": 7 }));
    assert_eq!(attrs.get("client_id"), Some(&json!(1)));
}

// ============ Required Fields and Probe Heuristic ============

#[test]
fn test_missing_required_fields_reported() {
    let attrs = normalize_attributes(&json!({ "client_id": 1, "foo": 1, "bar": 2 }));
    let missing = missing_required_fields(&attrs);
    assert_eq!(missing, vec!["amount".to_string()]);

    let attrs = normalize_attributes(&json!({ "foo": 1, "bar": 2, "baz": 3 }));
    let missing = missing_required_fields(&attrs);
    assert_eq!(
        missing,
        vec!["client_id".to_string(), "amount".to_string()]
    );
}

#[test]
fn test_null_field_counts_as_missing() {
    let attrs = normalize_attributes(&json!({ "client_id": 1, "amount": null, "x": 1 }));
    assert_eq!(missing_required_fields(&attrs), vec!["amount".to_string()]);
}

#[test]
fn test_complete_payload_has_no_missing_fields() {
    let attrs = normalize_attributes(&json!({ "client_id": 1, "amount": 100 }));
    assert!(missing_required_fields(&attrs).is_empty());
}

#[test]
fn test_probe_threshold() {
    let small = normalize_attributes(&json!({ "client_id": 1 }));
    assert!(looks_like_test_probe(&small), "under 3 keys is a probe");

    let larger = normalize_attributes(&json!({ "client_id": 1, "foo": 1, "bar": 2 }));
    assert!(!looks_like_test_probe(&larger), "3 keys is not a probe");
}

// ============ Transaction Id Synthesis ============

#[test]
fn test_synthesized_id_shape() {
    let id = synthesize_transaction_id(42);
    assert!(id.starts_with("SPX-"), "id should carry the SPX prefix");
    assert!(id.ends_with("-42"), "id should end with the client id");
}

#[test]
fn test_synthesized_ids_distinct_per_client() {
    let a = synthesize_transaction_id(1);
    let b = synthesize_transaction_id(2);
    assert_ne!(a, b);
}

// ============ Lenient Value Readers ============

#[test]
fn test_value_readers_accept_numeric_strings() {
    assert_eq!(splynx::value_as_i64(&json!("42")), Some(42));
    assert_eq!(splynx::value_as_i64(&json!(42)), Some(42));
    assert_eq!(splynx::value_as_i64(&json!("abc")), None);

    assert_eq!(splynx::value_as_f64(&json!("99.5")), Some(99.5));
    assert_eq!(splynx::value_as_f64(&json!(99.5)), Some(99.5));

    assert_eq!(
        splynx::value_as_string(&json!(123)),
        Some("123".to_string())
    );
    assert_eq!(
        splynx::value_as_string(&json!("TXN-1")),
        Some("TXN-1".to_string())
    );
    assert_eq!(splynx::value_as_string(&json!("")), None);
}
