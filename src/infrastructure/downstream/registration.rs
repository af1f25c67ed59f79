use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainError, RegistrationApi};

/// HTTP client for the customer registration service.
///
/// Issues `GET {base_url}/{phone_number}` with a bearer token. The caller
/// normalizes the phone number before it reaches this client.
#[derive(Debug, Clone)]
pub struct HttpRegistrationApi {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl HttpRegistrationApi {
    pub fn new(client: Client, base_url: impl Into<String>, access_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {access_token}"),
        }
    }
}

#[async_trait]
impl RegistrationApi for HttpRegistrationApi {
    async fn check_registration(&self, phone_number: &str) -> Result<Value, DomainError> {
        let url = format!("{}/{}", self.base_url, phone_number);
        debug!(%url, "checking customer registration");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(|e| DomainError::downstream("registration", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::downstream(
                "registration",
                format!("HTTP {status}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::downstream("registration", e.to_string()))
    }
}
