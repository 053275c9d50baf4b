use rusqlite::Connection;

/// Initialize the database schema.
///
/// WAL mode suits the workload: webhook and sync logs are append-only,
/// payments are written twice (pending, then final).
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;

        -- Payments received from Splynx webhooks.
        -- UNIQUE(transaction_id) is the authoritative idempotency guard;
        -- the handler's lookup is only a fast path.
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            transaction_id TEXT NOT NULL UNIQUE,
            client_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            currency_code TEXT NOT NULL DEFAULT 'KES',
            payment_type TEXT,
            payment_method TEXT,
            status TEXT NOT NULL CHECK (status IN ('pending', 'success', 'failed')),
            response_payload TEXT,
            error_message TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payments_client ON payments(client_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status);
        CREATE INDEX IF NOT EXISTS idx_payments_created ON payments(created_at DESC);

        -- Local mirror of UISP clients. id is the UISP client id.
        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            full_name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            street TEXT,
            city TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_suspended INTEGER NOT NULL DEFAULT 0,
            balance REAL NOT NULL DEFAULT 0,
            last_payment_at INTEGER,
            synced_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(full_name);
        CREATE INDEX IF NOT EXISTS idx_clients_email ON clients(email);

        -- Inbound webhook audit trail. Append-only, never mutated.
        CREATE TABLE IF NOT EXISTS webhook_logs (
            id TEXT PRIMARY KEY,
            received_at INTEGER NOT NULL,
            source_ip TEXT,
            headers TEXT NOT NULL,
            body TEXT NOT NULL,
            signature_valid INTEGER NOT NULL,
            outcome TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_webhook_logs_time ON webhook_logs(received_at DESC);

        -- Client synchronization runs. Append-only.
        CREATE TABLE IF NOT EXISTS sync_logs (
            id TEXT PRIMARY KEY,
            sync_type TEXT NOT NULL CHECK (sync_type IN ('full', 'single')),
            status TEXT NOT NULL CHECK (status IN ('completed', 'failed')),
            clients_synced INTEGER NOT NULL DEFAULT 0,
            clients_failed INTEGER NOT NULL DEFAULT 0,
            detail TEXT,
            started_at INTEGER NOT NULL,
            finished_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sync_logs_time ON sync_logs(started_at DESC);
        "#,
    )?;
    Ok(())
}
