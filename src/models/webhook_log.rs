use serde::Serialize;

/// Append-only audit record of an inbound webhook request.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookLog {
    pub id: String,
    pub received_at: i64,
    pub source_ip: Option<String>,
    /// Request headers as a JSON object string.
    pub headers: String,
    /// Raw request body.
    pub body: String,
    pub signature_valid: bool,
    /// Validation outcome, e.g. "accepted" or "invalid_signature".
    pub outcome: String,
}

#[derive(Debug, Clone)]
pub struct CreateWebhookLog {
    pub source_ip: Option<String>,
    pub headers: String,
    pub body: String,
    pub signature_valid: bool,
    pub outcome: String,
}
