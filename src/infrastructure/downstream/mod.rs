//! Reqwest clients for the two enrichment services
//!
//! Implements the domain's [`RegistrationApi`] and [`OrdersApi`] seams
//! against the internal HTTP services. Any non-2xx response or transport
//! fault surfaces as a [`DomainError::Downstream`], which the calling stage
//! turns into a stage-reported failure.

mod orders;
mod registration;

pub use orders::HttpOrdersApi;
pub use registration::HttpRegistrationApi;

use std::time::Duration;

use reqwest::Client;

use crate::config::DownstreamConfig;
use crate::domain::DomainError;

fn build_client(timeout_secs: u64) -> Result<Client, DomainError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {e}")))
}

/// Build both clients from one configuration block.
pub fn build_downstream_apis(
    config: &DownstreamConfig,
) -> Result<(HttpRegistrationApi, HttpOrdersApi), DomainError> {
    let client = build_client(config.timeout_secs)?;
    let registration = HttpRegistrationApi::new(
        client.clone(),
        &config.registration_base_url,
        &config.access_token,
    );
    let orders = HttpOrdersApi::new(client, &config.orders_base_url, &config.access_token);
    Ok((registration, orders))
}
