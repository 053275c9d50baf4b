use serde::{Deserialize, Serialize};

/// Local mirror of a UISP client, plus the locally tracked
/// `last_payment_at` timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// UISP client id.
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub balance: f64,
    /// Updated opportunistically after a successful post-payment resync.
    pub last_payment_at: Option<i64>,
    pub synced_at: i64,
}

/// UISP-sourced attributes written on every sync. `last_payment_at` is
/// deliberately absent: the upsert never clobbers it.
#[derive(Debug, Clone)]
pub struct UpsertClient {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub balance: f64,
}

/// Filters for the client list endpoint. When `search` is set it overrides
/// the boolean filters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClientFilters {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub is_suspended: Option<bool>,
}

/// Aggregate client statistics for `/api/clients/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub total_clients: i64,
    pub active_count: i64,
    pub suspended_count: i64,
    /// Clients with a recorded last payment.
    pub with_payment_count: i64,
}
