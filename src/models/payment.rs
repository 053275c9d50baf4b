use serde::{Deserialize, Serialize};

/// A payment received from Splynx, keyed by transaction id.
///
/// Exactly one record exists per `transaction_id`; the status only ever
/// moves pending -> success or pending -> failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub transaction_id: String,
    pub client_id: i64,
    pub amount: f64,
    pub currency_code: String,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub status: PaymentStatus,
    /// Raw UISP response body, set when the forward succeeds.
    pub response_payload: Option<String>,
    /// Remote error detail, set when the forward fails.
    pub error_message: Option<String>,
    pub created_at: i64,
}

/// Data required to record a new pending payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub transaction_id: String,
    pub client_id: i64,
    pub amount: f64,
    pub currency_code: String,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate payment statistics for `/api/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStats {
    pub total_payments: i64,
    pub pending_count: i64,
    pub success_count: i64,
    pub failed_count: i64,
    /// Sum of `amount` across successful payments.
    pub total_success_amount: f64,
}
