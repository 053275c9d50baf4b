pub mod clients;
pub mod payments;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Inbound webhooks (signature auth)
        .route("/webhook/payment", post(webhook::handle_payment_webhook))
        .route("/webhook/test", get(webhook::webhook_test))
        // Payment queries
        .route("/api/payments", get(payments::list_payments))
        .route("/api/payments/{transaction_id}", get(payments::get_payment))
        .route(
            "/api/clients/{client_id}/payments",
            get(payments::list_client_payments),
        )
        .route("/api/stats", get(payments::payment_stats))
        .route("/api/health", get(payments::health))
        // Client queries and sync triggers
        .route("/api/clients", get(clients::list_clients))
        .route("/api/clients/stats", get(clients::client_stats))
        .route("/api/clients/{client_id}", get(clients::get_client))
        .route(
            "/api/clients/{client_id}/uisp-payments",
            get(clients::get_client_uisp_payments),
        )
        .route("/api/clients/sync", post(clients::sync_all_clients))
        .route(
            "/api/clients/sync/wait",
            post(clients::sync_all_clients_wait),
        )
        .route(
            "/api/clients/{client_id}/sync",
            post(clients::sync_single_client),
        )
        .route("/api/sync/logs", get(clients::list_sync_logs))
}
