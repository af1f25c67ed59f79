use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::{DomainError, OrdersApi};

/// HTTP client for the customer orders service.
///
/// Issues `POST {base_url}` with body `{"store_number": <phone>}` and a
/// bearer token.
#[derive(Debug, Clone)]
pub struct HttpOrdersApi {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl HttpOrdersApi {
    pub fn new(client: Client, base_url: impl Into<String>, access_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {access_token}"),
        }
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn fetch_orders(&self, phone_number: &str) -> Result<Value, DomainError> {
        debug!(url = %self.base_url, "fetching customer orders");

        let response = self
            .client
            .post(&self.base_url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .json(&json!({ "store_number": phone_number }))
            .send()
            .await
            .map_err(|e| DomainError::downstream("orders", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::downstream("orders", format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::downstream("orders", e.to_string()))
    }
}
