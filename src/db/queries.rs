use chrono::Utc;
use rusqlite::{params, types::Value, Connection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_all, query_one, CLIENT_COLS, PAYMENT_COLS, SYNC_LOG_COLS, WEBHOOK_LOG_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Payments ============

/// Insert a payment with status `pending`.
///
/// Fails with a UNIQUE violation when the transaction id already exists;
/// callers treat that as a duplicate delivery, not a server error.
pub fn insert_pending_payment(conn: &Connection, input: &CreatePayment) -> Result<Payment> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO payments (id, transaction_id, client_id, amount, currency_code,
                               payment_type, payment_method, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &id,
            &input.transaction_id,
            input.client_id,
            input.amount,
            &input.currency_code,
            &input.payment_type,
            &input.payment_method,
            PaymentStatus::Pending.as_str(),
            now,
        ],
    )?;

    Ok(Payment {
        id,
        transaction_id: input.transaction_id.clone(),
        client_id: input.client_id,
        amount: input.amount,
        currency_code: input.currency_code.clone(),
        payment_type: input.payment_type.clone(),
        payment_method: input.payment_method.clone(),
        status: PaymentStatus::Pending,
        response_payload: None,
        error_message: None,
        created_at: now,
    })
}

pub fn get_payment_by_transaction_id(
    conn: &Connection,
    transaction_id: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE transaction_id = ?1",
            PAYMENT_COLS
        ),
        &[&transaction_id],
    )
}

pub fn list_payments_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Payment>, i64)> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM payments ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
            PAYMENT_COLS
        ),
        &[&limit, &offset],
    )?;
    Ok((items, total))
}

pub fn list_payments_by_client(conn: &Connection, client_id: i64) -> Result<Vec<Payment>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE client_id = ?1 ORDER BY created_at DESC",
            PAYMENT_COLS
        ),
        &[&client_id],
    )
}

/// Finalize a pending payment as successful, storing the UISP response.
///
/// The `status = 'pending'` guard enforces the one-way transition: a
/// payment that already reached a final state is never rewritten.
/// Returns true when a row was updated.
pub fn mark_payment_success(
    conn: &Connection,
    transaction_id: &str,
    response_payload: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE payments SET status = ?1, response_payload = ?2
         WHERE transaction_id = ?3 AND status = ?4",
        params![
            PaymentStatus::Success.as_str(),
            response_payload,
            transaction_id,
            PaymentStatus::Pending.as_str(),
        ],
    )?;
    Ok(affected > 0)
}

/// Finalize a pending payment as failed, storing the remote error detail.
/// Same one-way guard as [`mark_payment_success`].
pub fn mark_payment_failed(
    conn: &Connection,
    transaction_id: &str,
    error_message: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE payments SET status = ?1, error_message = ?2
         WHERE transaction_id = ?3 AND status = ?4",
        params![
            PaymentStatus::Failed.as_str(),
            error_message,
            transaction_id,
            PaymentStatus::Pending.as_str(),
        ],
    )?;
    Ok(affected > 0)
}

pub fn payment_stats(conn: &Connection) -> Result<PaymentStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'success' THEN amount ELSE 0 END), 0)
         FROM payments",
        [],
        |row| {
            Ok(PaymentStats {
                total_payments: row.get(0)?,
                pending_count: row.get(1)?,
                success_count: row.get(2)?,
                failed_count: row.get(3)?,
                total_success_amount: row.get(4)?,
            })
        },
    )?;
    Ok(stats)
}

// ============ Clients ============

/// Insert or refresh a client from UISP attributes.
///
/// `last_payment_at` is locally owned and survives the upsert untouched.
pub fn upsert_client(conn: &Connection, input: &UpsertClient) -> Result<Client> {
    let now = now();

    conn.execute(
        "INSERT INTO clients (id, first_name, last_name, full_name, email, phone,
                              street, city, is_active, is_suspended, balance, synced_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
             first_name = excluded.first_name,
             last_name = excluded.last_name,
             full_name = excluded.full_name,
             email = excluded.email,
             phone = excluded.phone,
             street = excluded.street,
             city = excluded.city,
             is_active = excluded.is_active,
             is_suspended = excluded.is_suspended,
             balance = excluded.balance,
             synced_at = excluded.synced_at",
        params![
            input.id,
            &input.first_name,
            &input.last_name,
            &input.full_name,
            &input.email,
            &input.phone,
            &input.street,
            &input.city,
            input.is_active as i32,
            input.is_suspended as i32,
            input.balance,
            now,
        ],
    )?;

    // Re-read to pick up the preserved last_payment_at.
    let client = get_client(conn, input.id)?;
    client.ok_or_else(|| {
        crate::error::AppError::Internal(format!("client {} missing after upsert", input.id))
    })
}

pub fn get_client(conn: &Connection, id: i64) -> Result<Option<Client>> {
    query_one(
        conn,
        &format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLS),
        &[&id],
    )
}

/// List clients with pagination and filters.
///
/// `search` matches name or email and, when present, overrides the
/// boolean filters entirely.
pub fn list_clients_paginated(
    conn: &Connection,
    filters: &ClientFilters,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Client>, i64)> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        clauses.push(format!(
            "(full_name LIKE ?{n} OR email LIKE ?{n})",
            n = values.len() + 1
        ));
        values.push(pattern.into());
    } else {
        if let Some(is_active) = filters.is_active {
            clauses.push(format!("is_active = ?{}", values.len() + 1));
            values.push((is_active as i32).into());
        }
        if let Some(is_suspended) = filters.is_suspended {
            clauses.push(format!("is_suspended = ?{}", values.len() + 1));
            values.push((is_suspended as i32).into());
        }
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM clients {}", where_clause),
        rusqlite::params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    values.push(limit.into());
    values.push(offset.into());
    let sql = format!(
        "SELECT {} FROM clients {} ORDER BY full_name LIMIT ?{} OFFSET ?{}",
        CLIENT_COLS,
        where_clause,
        values.len() - 1,
        values.len()
    );

    let params: Vec<&dyn rusqlite::ToSql> =
        values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
    let items = query_all(conn, &sql, &params)?;

    Ok((items, total))
}

pub fn client_stats(conn: &Connection) -> Result<ClientStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN is_suspended = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN last_payment_at IS NOT NULL THEN 1 ELSE 0 END), 0)
         FROM clients",
        [],
        |row| {
            Ok(ClientStats {
                total_clients: row.get(0)?,
                active_count: row.get(1)?,
                suspended_count: row.get(2)?,
                with_payment_count: row.get(3)?,
            })
        },
    )?;
    Ok(stats)
}

/// Record the time of a client's latest successful payment.
/// Returns true when the client exists locally.
pub fn touch_client_last_payment(conn: &Connection, client_id: i64, paid_at: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE clients SET last_payment_at = ?1 WHERE id = ?2",
        params![paid_at, client_id],
    )?;
    Ok(affected > 0)
}

// ============ Webhook logs ============

pub fn append_webhook_log(conn: &Connection, input: &CreateWebhookLog) -> Result<WebhookLog> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO webhook_logs (id, received_at, source_ip, headers, body,
                                   signature_valid, outcome)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            now,
            &input.source_ip,
            &input.headers,
            &input.body,
            input.signature_valid as i32,
            &input.outcome,
        ],
    )?;

    Ok(WebhookLog {
        id,
        received_at: now,
        source_ip: input.source_ip.clone(),
        headers: input.headers.clone(),
        body: input.body.clone(),
        signature_valid: input.signature_valid,
        outcome: input.outcome.clone(),
    })
}

pub fn list_recent_webhook_logs(conn: &Connection, limit: i64) -> Result<Vec<WebhookLog>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM webhook_logs ORDER BY received_at DESC, id LIMIT ?1",
            WEBHOOK_LOG_COLS
        ),
        &[&limit],
    )
}

// ============ Sync logs ============

pub fn append_sync_log(conn: &Connection, input: &CreateSyncLog) -> Result<SyncLog> {
    let id = gen_id();

    conn.execute(
        "INSERT INTO sync_logs (id, sync_type, status, clients_synced, clients_failed,
                                detail, started_at, finished_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            input.sync_type.as_str(),
            input.status.as_str(),
            input.clients_synced,
            input.clients_failed,
            &input.detail,
            input.started_at,
            input.finished_at,
        ],
    )?;

    Ok(SyncLog {
        id,
        sync_type: input.sync_type,
        status: input.status,
        clients_synced: input.clients_synced,
        clients_failed: input.clients_failed,
        detail: input.detail.clone(),
        started_at: input.started_at,
        finished_at: input.finished_at,
    })
}

pub fn list_recent_sync_logs(conn: &Connection, limit: i64) -> Result<Vec<SyncLog>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM sync_logs ORDER BY started_at DESC, id LIMIT ?1",
            SYNC_LOG_COLS
        ),
        &[&limit],
    )
}
