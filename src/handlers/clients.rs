//! Client query endpoints, UISP proxies, and sync triggers.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{queries, AppState};
use crate::error::Result;
use crate::extractors::{Json, Path, Query};
use crate::models::{Client, ClientFilters, ClientStats, SyncLog, SyncSummary};
use crate::pagination::Paginated;
use crate::response::{ok, ApiResponse};
use crate::sync;
use crate::uisp::UispClientRecord;

#[derive(Deserialize)]
pub struct ClientPath {
    pub client_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    /// Matches name or email; overrides the boolean filters when present.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub is_suspended: Option<bool>,
    /// Max results to return (default 50, max 100)
    pub limit: Option<i64>,
    /// Offset for pagination (default 0)
    pub offset: Option<i64>,
}

impl ListClientsQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    fn to_filters(&self) -> ClientFilters {
        ClientFilters {
            search: self.search.clone(),
            is_active: self.is_active,
            is_suspended: self.is_suspended,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncLogsQuery {
    pub limit: Option<i64>,
}

impl SyncLogsQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// GET /api/clients?limit&offset&search&is_active&is_suspended
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<ApiResponse<Paginated<Client>>>> {
    let conn = state.db.get()?;

    let limit = query.limit();
    let offset = query.offset();
    let (clients, total) =
        queries::list_clients_paginated(&conn, &query.to_filters(), limit, offset)?;

    Ok(ok(
        Paginated::new(clients, total, limit, offset),
        "Clients retrieved",
    ))
}

/// GET /api/clients/stats
pub async fn client_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ClientStats>>> {
    let conn = state.db.get()?;
    let stats = queries::client_stats(&conn)?;
    Ok(ok(stats, "Client statistics retrieved"))
}

/// GET /api/clients/{client_id} - proxies the UISP CRM record.
pub async fn get_client(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<UispClientRecord>>> {
    let record = state.uisp.get_client(path.client_id).await?;
    Ok(ok(record, "Client retrieved"))
}

/// GET /api/clients/{client_id}/uisp-payments - payment history as UISP
/// reports it, not the local mirror.
pub async fn get_client_uisp_payments(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Value>>> {
    let payments = state.uisp.get_client_payments(path.client_id).await?;
    Ok(ok(payments, "UISP payments retrieved"))
}

/// POST /api/clients/sync - fire-and-forget full sync. Returns
/// immediately; completion is observable via the sync logs.
pub async fn sync_all_clients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>> {
    sync::spawn_full_sync(state.clone());
    Ok(ok(json!({ "status": "in_progress" }), "Client sync started"))
}

/// POST /api/clients/sync/wait - blocks until the full sync completes.
pub async fn sync_all_clients_wait(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SyncSummary>>> {
    let summary = sync::run_full_sync(&state).await?;
    Ok(ok(summary, "Client sync completed"))
}

/// POST /api/clients/{client_id}/sync - sync one client inline.
pub async fn sync_single_client(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Client>>> {
    let client = sync::sync_client(&state, path.client_id).await?;
    Ok(ok(client, "Client synced"))
}

/// GET /api/sync/logs?limit
pub async fn list_sync_logs(
    State(state): State<AppState>,
    Query(query): Query<SyncLogsQuery>,
) -> Result<Json<ApiResponse<Vec<SyncLog>>>> {
    let conn = state.db.get()?;
    let logs = queries::list_recent_sync_logs(&conn, query.limit())?;
    Ok(ok(logs, "Sync logs retrieved"))
}
