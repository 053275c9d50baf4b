//! Inbound Splynx payment webhook.
//!
//! Processing order: audit log, signature check, payload normalization,
//! ping/probe short-circuits, idempotency check, durable pending write,
//! UISP post, final status write, detached client resync. At most one
//! processing attempt happens per transaction id no matter how many times
//! Splynx redelivers.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use chrono::Utc;
use serde_json::{json, Value};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{CreatePayment, CreateWebhookLog, Payment};
use crate::response::{ok, ApiResponse};
use crate::splynx;
use crate::uisp::UispPaymentRequest;
use crate::util::{client_ip, headers_to_json};

const DEFAULT_CURRENCY: &str = "KES";

type WebhookResponse = Json<ApiResponse<Value>>;

/// GET /webhook/test - liveness probe.
pub async fn webhook_test() -> WebhookResponse {
    ok(Value::Null, "Webhook endpoint reachable")
}

/// POST /webhook/payment
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WebhookResponse> {
    let signature = headers
        .get("x-splynx-signature")
        .and_then(|v| v.to_str().ok());

    let signature_valid = signature
        .map(|sig| state.verifier.verify(&body, sig))
        .unwrap_or(false);

    let conn = state.db.get()?;

    // Audit entry goes in before the payload is interpreted, valid
    // signature or not. A log failure must not fail the request.
    let outcome = match (signature, signature_valid) {
        (None, _) => "missing_signature",
        (Some(_), false) => "invalid_signature",
        (Some(_), true) => "accepted",
    };
    if let Err(e) = queries::append_webhook_log(
        &conn,
        &CreateWebhookLog {
            source_ip: client_ip(&headers),
            headers: headers_to_json(&headers),
            body: String::from_utf8_lossy(&body).to_string(),
            signature_valid,
            outcome: outcome.to_string(),
        },
    ) {
        tracing::warn!("Failed to append webhook log: {}", e);
    }

    if signature.is_none() {
        return Err(AppError::Authentication(msg::MISSING_SIGNATURE.into()));
    }
    if !signature_valid {
        return Err(AppError::Authentication(msg::INVALID_SIGNATURE.into()));
    }

    // Shape tolerance: anything unparseable normalizes to an empty map,
    // which is handled as a ping below.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let attrs = splynx::normalize_attributes(&payload);

    if attrs.is_empty() {
        return Ok(ok(Value::Null, "Webhook acknowledged"));
    }

    let missing = splynx::missing_required_fields(&attrs);
    if !missing.is_empty() {
        if splynx::looks_like_test_probe(&attrs) {
            return Ok(ok(Value::Null, "Test payload acknowledged"));
        }
        return Err(AppError::MissingFields(missing));
    }

    let client_id = attrs
        .get("client_id")
        .and_then(splynx::value_as_i64)
        .ok_or_else(|| AppError::BadRequest(msg::INVALID_CLIENT_ID.into()))?;
    let amount = attrs
        .get("amount")
        .and_then(splynx::value_as_f64)
        .ok_or_else(|| AppError::BadRequest(msg::INVALID_AMOUNT.into()))?;

    let transaction_id = attrs
        .get("transaction_id")
        .and_then(splynx::value_as_string)
        .unwrap_or_else(|| splynx::synthesize_transaction_id(client_id));

    // Fast path: the record already exists, report its status and stop.
    // Redelivery never triggers a second processing attempt.
    if let Some(existing) = queries::get_payment_by_transaction_id(&conn, &transaction_id)? {
        return Ok(duplicate_response(&existing));
    }

    let create = CreatePayment {
        transaction_id: transaction_id.clone(),
        client_id,
        amount,
        currency_code: attrs
            .get("currency_code")
            .and_then(splynx::value_as_string)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        payment_type: attrs.get("payment_type").and_then(splynx::value_as_string),
        payment_method: attrs
            .get("payment_method")
            .and_then(splynx::value_as_string),
    };

    // The pending record must be durable before any external call; an
    // in-flight payment with no local record would be unrecoverable.
    let pending = match queries::insert_pending_payment(&conn, &create) {
        Ok(payment) => payment,
        Err(e) if e.is_unique_violation() => {
            // Lost the race against a concurrent delivery of the same
            // transaction id; the winner's record is authoritative.
            let existing = queries::get_payment_by_transaction_id(&conn, &transaction_id)?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "payment {} vanished after duplicate insert",
                        transaction_id
                    ))
                })?;
            return Ok(duplicate_response(&existing));
        }
        Err(e) => return Err(e),
    };

    let request = UispPaymentRequest {
        client_id,
        amount,
        currency_code: pending.currency_code.clone(),
        method_id: pending.payment_method.clone(),
        note: Some(format!("Splynx transaction {}", transaction_id)),
    };

    match state.uisp.post_payment(&request).await {
        Ok(response) => {
            queries::mark_payment_success(&conn, &transaction_id, &response.to_string())?;

            // Detached from the response: resync the client and stamp the
            // payment time. Failures are logged, never surfaced.
            crate::sync::spawn_payment_followup(
                state.clone(),
                client_id,
                Utc::now().timestamp(),
            );

            tracing::info!(
                "Payment {} for client {} forwarded to UISP",
                transaction_id,
                client_id
            );

            Ok(ok(
                json!({
                    "transactionId": transaction_id,
                    "status": "success",
                }),
                "Payment processed",
            ))
        }
        Err(e) => {
            let detail = e.to_string();
            // Record the failure before surfacing it; Splynx will redeliver
            // and the idempotency check will answer with the failed status.
            if let Err(db_err) =
                queries::mark_payment_failed(&conn, &transaction_id, &detail)
            {
                tracing::error!(
                    "Failed to record failure for payment {}: {}",
                    transaction_id,
                    db_err
                );
            }
            tracing::error!(
                "UISP post for payment {} failed: {}",
                transaction_id,
                detail
            );
            Err(e)
        }
    }
}

fn duplicate_response(existing: &Payment) -> WebhookResponse {
    ok(
        json!({
            "transactionId": existing.transaction_id,
            "status": existing.status,
        }),
        "Webhook already processed",
    )
}
