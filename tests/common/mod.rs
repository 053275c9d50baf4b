//! Test utilities and fixtures for paysync integration tests

#![allow(dead_code)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use paysync::config::{SplynxConfig, UispConfig};
pub use paysync::db::{init_db, queries, AppState, DbPool};
pub use paysync::models::*;
pub use paysync::splynx::SplynxWebhookVerifier;
pub use paysync::uisp::UispClient;

pub const TEST_WEBHOOK_SECRET: &str = "splynx_test_secret";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a single-connection in-memory pool. One connection keeps every
/// request on the same in-memory database.
pub fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to build pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize schema");
    }
    pool
}

/// App state wired against an unreachable UISP endpoint, so external posts
/// fail fast and deterministically.
pub fn test_state() -> AppState {
    AppState {
        db: test_pool(),
        uisp: UispClient::new(&UispConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            app_key: "test-app-key".to_string(),
        }),
        verifier: SplynxWebhookVerifier::new(&SplynxConfig {
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        }),
    }
}

/// Insert a pending payment with default attributes
pub fn create_test_payment(
    conn: &Connection,
    transaction_id: &str,
    client_id: i64,
    amount: f64,
) -> Payment {
    queries::insert_pending_payment(
        conn,
        &CreatePayment {
            transaction_id: transaction_id.to_string(),
            client_id,
            amount,
            currency_code: "KES".to_string(),
            payment_type: Some("online".to_string()),
            payment_method: Some("mpesa".to_string()),
        },
    )
    .expect("Failed to insert test payment")
}

/// Upsert a client with default attributes
pub fn upsert_test_client(conn: &Connection, id: i64, full_name: &str) -> Client {
    queries::upsert_client(
        conn,
        &UpsertClient {
            id,
            first_name: None,
            last_name: None,
            full_name: full_name.to_string(),
            email: Some(format!("client{}@example.com", id)),
            phone: None,
            street: None,
            city: None,
            is_active: true,
            is_suspended: false,
            balance: 0.0,
        },
    )
    .expect("Failed to upsert test client")
}

/// Compute the Splynx webhook signature for a payload (hex HMAC-SHA256)
pub fn sign_body(payload: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(TEST_WEBHOOK_SECRET.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
