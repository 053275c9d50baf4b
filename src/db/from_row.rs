//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const PAYMENT_COLS: &str = "id, transaction_id, client_id, amount, currency_code, payment_type, payment_method, status, response_payload, error_message, created_at";

pub const CLIENT_COLS: &str = "id, first_name, last_name, full_name, email, phone, street, city, is_active, is_suspended, balance, last_payment_at, synced_at";

pub const WEBHOOK_LOG_COLS: &str =
    "id, received_at, source_ip, headers, body, signature_valid, outcome";

pub const SYNC_LOG_COLS: &str =
    "id, sync_type, status, clients_synced, clients_failed, detail, started_at, finished_at";

// ============ FromRow Implementations ============

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            transaction_id: row.get(1)?,
            client_id: row.get(2)?,
            amount: row.get(3)?,
            currency_code: row.get(4)?,
            payment_type: row.get(5)?,
            payment_method: row.get(6)?,
            status: parse_enum(row, 7, "status")?,
            response_payload: row.get(8)?,
            error_message: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

impl FromRow for Client {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Client {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            full_name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            street: row.get(6)?,
            city: row.get(7)?,
            is_active: row.get::<_, i32>(8)? != 0,
            is_suspended: row.get::<_, i32>(9)? != 0,
            balance: row.get(10)?,
            last_payment_at: row.get(11)?,
            synced_at: row.get(12)?,
        })
    }
}

impl FromRow for WebhookLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WebhookLog {
            id: row.get(0)?,
            received_at: row.get(1)?,
            source_ip: row.get(2)?,
            headers: row.get(3)?,
            body: row.get(4)?,
            signature_valid: row.get::<_, i32>(5)? != 0,
            outcome: row.get(6)?,
        })
    }
}

impl FromRow for SyncLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SyncLog {
            id: row.get(0)?,
            sync_type: parse_enum(row, 1, "sync_type")?,
            status: parse_enum(row, 2, "status")?,
            clients_synced: row.get(3)?,
            clients_failed: row.get(4)?,
            detail: row.get(5)?,
            started_at: row.get(6)?,
            finished_at: row.get(7)?,
        })
    }
}
