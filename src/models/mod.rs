mod client;
mod payment;
mod sync_log;
mod webhook_log;

pub use client::{Client, ClientFilters, ClientStats, UpsertClient};
pub use payment::{CreatePayment, Payment, PaymentStats, PaymentStatus};
pub use sync_log::{CreateSyncLog, SyncLog, SyncStatus, SyncSummary, SyncType};
pub use webhook_log::{CreateWebhookLog, WebhookLog};
