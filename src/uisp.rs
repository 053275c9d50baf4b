//! Outbound client for the UISP CRM API.
//!
//! Each method is a single call (or a bounded page loop for
//! [`UispClient::fetch_all_clients`]). No retry or backoff: the webhook
//! handler relies on provider-side redelivery, and the sync runner counts
//! failures per client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::UispConfig;
use crate::error::{AppError, Result};
use crate::models::UpsertClient;

/// Page size for the client listing loop.
const CLIENT_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct UispClient {
    client: Client,
    base_url: String,
    app_key: String,
}

/// Payment payload posted to UISP.
#[derive(Debug, Serialize)]
pub struct UispPaymentRequest {
    #[serde(rename = "clientId")]
    pub client_id: i64,
    pub amount: f64,
    #[serde(rename = "currencyCode")]
    pub currency_code: String,
    #[serde(rename = "methodId", skip_serializing_if = "Option::is_none")]
    pub method_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Client attributes as returned by the UISP CRM API.
/// Serialized back out unchanged by the proxy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UispClientRecord {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street1: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "isSuspended", default)]
    pub is_suspended: bool,
    #[serde(rename = "accountBalance", default)]
    pub account_balance: f64,
}

fn default_true() -> bool {
    true
}

impl UispClientRecord {
    /// Map UISP attributes onto the local client mirror.
    pub fn to_upsert(&self) -> UpsertClient {
        let full_name = match (&self.company_name, &self.first_name, &self.last_name) {
            (Some(company), _, _) if !company.is_empty() => company.clone(),
            (_, Some(first), Some(last)) => format!("{} {}", first, last),
            (_, Some(first), None) => first.clone(),
            (_, None, Some(last)) => last.clone(),
            _ => format!("Client #{}", self.id),
        };

        UpsertClient {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name,
            email: self.email.clone(),
            phone: self.phone.clone(),
            street: self.street1.clone(),
            city: self.city.clone(),
            is_active: self.is_active,
            is_suspended: self.is_suspended,
            balance: self.account_balance,
        }
    }
}

impl UispClient {
    pub fn new(config: &UispConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_key: config.app_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into an error carrying the remote detail.
    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(AppError::ExternalService(format!(
            "{} ({}): {}",
            context, status, detail
        )))
    }

    /// Post a payment for a client. Returns the raw UISP response body,
    /// which the caller stores on the payment record.
    pub async fn post_payment(&self, payment: &UispPaymentRequest) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/payments"))
            .header("X-Auth-App-Key", &self.app_key)
            .json(payment)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("UISP payment post failed: {}", e)))?;

        let response = Self::check(response, "UISP payment post rejected").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid UISP response: {}", e)))
    }

    /// Fetch a single client's attributes. An unknown client id surfaces
    /// as a not-found error, not an external-service failure.
    pub async fn get_client(&self, client_id: i64) -> Result<UispClientRecord> {
        let response = self
            .client
            .get(self.url(&format!("/clients/{}", client_id)))
            .header("X-Auth-App-Key", &self.app_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("UISP client fetch failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(crate::error::msg::CLIENT_NOT_FOUND.into()));
        }

        let response = Self::check(response, "UISP client fetch rejected").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid UISP client: {}", e)))
    }

    /// Fetch a client's payment history as UISP reports it.
    pub async fn get_client_payments(&self, client_id: i64) -> Result<Value> {
        let response = self
            .client
            .get(self.url("/payments"))
            .query(&[("clientId", client_id)])
            .header("X-Auth-App-Key", &self.app_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("UISP payments fetch failed: {}", e)))?;

        let response = Self::check(response, "UISP payments fetch rejected").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid UISP payments: {}", e)))
    }

    /// Fetch one page of clients.
    pub async fn list_clients(&self, offset: i64, limit: i64) -> Result<Vec<UispClientRecord>> {
        let response = self
            .client
            .get(self.url("/clients"))
            .query(&[("offset", offset), ("limit", limit)])
            .header("X-Auth-App-Key", &self.app_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("UISP client list failed: {}", e)))?;

        let response = Self::check(response, "UISP client list rejected").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid UISP client list: {}", e)))
    }

    /// Fetch every client, paging until a short page.
    pub async fn fetch_all_clients(&self) -> Result<Vec<UispClientRecord>> {
        let mut all = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.list_clients(offset, CLIENT_PAGE_SIZE).await?;
            let page_len = page.len() as i64;
            all.extend(page);
            if page_len < CLIENT_PAGE_SIZE {
                break;
            }
            offset += CLIENT_PAGE_SIZE;
        }

        Ok(all)
    }
}
