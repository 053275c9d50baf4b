//! Read endpoints over persisted payments.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{queries, AppState};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Payment, PaymentStats};
use crate::pagination::{Paginated, PaginationQuery};
use crate::response::{ok, ApiResponse};

#[derive(Deserialize)]
pub struct PaymentPath {
    pub transaction_id: String,
}

#[derive(Deserialize)]
pub struct ClientPath {
    pub client_id: i64,
}

/// GET /api/payments?limit&offset
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Paginated<Payment>>>> {
    let conn = state.db.get()?;

    let limit = query.limit();
    let offset = query.offset();
    let (payments, total) = queries::list_payments_paginated(&conn, limit, offset)?;

    Ok(ok(
        Paginated::new(payments, total, limit, offset),
        "Payments retrieved",
    ))
}

/// GET /api/payments/{transaction_id}
pub async fn get_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
) -> Result<Json<ApiResponse<Payment>>> {
    let conn = state.db.get()?;

    let payment = queries::get_payment_by_transaction_id(&conn, &path.transaction_id)?
        .or_not_found(msg::TRANSACTION_NOT_FOUND)?;

    Ok(ok(payment, "Payment retrieved"))
}

/// GET /api/clients/{client_id}/payments
pub async fn list_client_payments(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Vec<Payment>>>> {
    let conn = state.db.get()?;
    let payments = queries::list_payments_by_client(&conn, path.client_id)?;
    Ok(ok(payments, "Client payments retrieved"))
}

/// GET /api/stats
pub async fn payment_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PaymentStats>>> {
    let conn = state.db.get()?;
    let stats = queries::payment_stats(&conn)?;
    Ok(ok(stats, "Payment statistics retrieved"))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>> {
    let conn = state.db.get()?;
    conn.query_row("SELECT 1", [], |_| Ok(()))?;
    Ok(ok(json!({ "status": "ok" }), "Service healthy"))
}
