//! Client synchronization between UISP and the local mirror.
//!
//! Sync runs are logged to `sync_logs` (append-only). The spawn_* variants
//! detach the work from the request lifecycle: their errors are logged and
//! swallowed, never surfaced to a caller.

use chrono::Utc;

use crate::db::{queries, AppState};
use crate::error::Result;
use crate::models::{Client, CreateSyncLog, SyncStatus, SyncSummary, SyncType};

/// Sync one client's attributes from UISP into local storage.
/// Appends a `single` sync log entry with the outcome.
pub async fn sync_client(state: &AppState, client_id: i64) -> Result<Client> {
    let started_at = Utc::now().timestamp();

    match state.uisp.get_client(client_id).await {
        Ok(record) => {
            let conn = state.db.get()?;
            let client = queries::upsert_client(&conn, &record.to_upsert())?;
            log_sync_run(
                state,
                CreateSyncLog {
                    sync_type: SyncType::Single,
                    status: SyncStatus::Completed,
                    clients_synced: 1,
                    clients_failed: 0,
                    detail: Some(format!("client {}", client_id)),
                    started_at,
                    finished_at: Utc::now().timestamp(),
                },
            );
            Ok(client)
        }
        Err(e) => {
            log_sync_run(
                state,
                CreateSyncLog {
                    sync_type: SyncType::Single,
                    status: SyncStatus::Failed,
                    clients_synced: 0,
                    clients_failed: 1,
                    detail: Some(format!("client {}: {}", client_id, e)),
                    started_at,
                    finished_at: Utc::now().timestamp(),
                },
            );
            Err(e)
        }
    }
}

/// Sync all UISP clients into local storage.
///
/// Per-client upsert failures are counted, logged, and do not abort the
/// run; a failure to list clients at all fails the run.
pub async fn run_full_sync(state: &AppState) -> Result<SyncSummary> {
    let started_at = Utc::now().timestamp();

    let records = match state.uisp.fetch_all_clients().await {
        Ok(records) => records,
        Err(e) => {
            log_sync_run(
                state,
                CreateSyncLog {
                    sync_type: SyncType::Full,
                    status: SyncStatus::Failed,
                    clients_synced: 0,
                    clients_failed: 0,
                    detail: Some(e.to_string()),
                    started_at,
                    finished_at: Utc::now().timestamp(),
                },
            );
            return Err(e);
        }
    };

    let conn = state.db.get()?;
    let total = records.len();
    let mut synced = 0usize;
    let mut failed = 0usize;

    for record in &records {
        match queries::upsert_client(&conn, &record.to_upsert()) {
            Ok(_) => synced += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!("Failed to upsert client {}: {}", record.id, e);
            }
        }
    }

    let summary = SyncSummary {
        total,
        synced,
        failed,
        started_at,
        finished_at: Utc::now().timestamp(),
    };

    log_sync_run(
        state,
        CreateSyncLog {
            sync_type: SyncType::Full,
            status: SyncStatus::Completed,
            clients_synced: synced as i64,
            clients_failed: failed as i64,
            detail: None,
            started_at,
            finished_at: summary.finished_at,
        },
    );

    tracing::info!(
        "Full client sync finished: {} synced, {} failed of {}",
        synced,
        failed,
        total
    );

    Ok(summary)
}

/// Kick off a full sync detached from the current request.
/// Completion is observable only through the sync logs.
pub fn spawn_full_sync(state: AppState) {
    tokio::spawn(async move {
        if let Err(e) = run_full_sync(&state).await {
            tracing::error!("Background full sync failed: {}", e);
        }
    });
}

/// Post-payment follow-up: refresh the client from UISP and stamp
/// `last_payment_at`. Runs detached; the webhook response never waits on it.
pub fn spawn_payment_followup(state: AppState, client_id: i64, paid_at: i64) {
    tokio::spawn(async move {
        match sync_client(&state, client_id).await {
            Ok(_) => {
                let conn = match state.db.get() {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Payment follow-up: no db connection: {}", e);
                        return;
                    }
                };
                if let Err(e) = queries::touch_client_last_payment(&conn, client_id, paid_at) {
                    tracing::warn!(
                        "Payment follow-up: failed to stamp last payment for client {}: {}",
                        client_id,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Payment follow-up: resync of client {} failed: {}",
                    client_id,
                    e
                );
            }
        }
    });
}

fn log_sync_run(state: &AppState, entry: CreateSyncLog) {
    let conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!("Failed to get db connection for sync log: {}", e);
            return;
        }
    };
    if let Err(e) = queries::append_sync_log(&conn, &entry) {
        tracing::warn!("Failed to append sync log: {}", e);
    }
}
