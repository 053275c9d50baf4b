use serde::Serialize;

/// Append-only record of a client synchronization run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncLog {
    pub id: String,
    pub sync_type: SyncType,
    pub status: SyncStatus,
    pub clients_synced: i64,
    pub clients_failed: i64,
    pub detail: Option<String>,
    pub started_at: i64,
    pub finished_at: i64,
}

#[derive(Debug, Clone)]
pub struct CreateSyncLog {
    pub sync_type: SyncType,
    pub status: SyncStatus,
    pub clients_synced: i64,
    pub clients_failed: i64,
    pub detail: Option<String>,
    pub started_at: i64,
    pub finished_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Full,
    Single,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Single => "single",
        }
    }
}

impl std::str::FromStr for SyncType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "single" => Ok(Self::Single),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

/// Result summary of a full client sync, returned by the blocking
/// sync endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub synced: usize,
    pub failed: usize,
    pub started_at: i64,
    pub finished_at: i64,
}
