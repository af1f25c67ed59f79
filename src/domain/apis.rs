//! Downstream service seams
//!
//! The pipeline enriches the event with data from two internal HTTP APIs.
//! The stages only see these traits; the reqwest implementations live in
//! `infrastructure::downstream`.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// Customer registration lookup (downstream service 1).
#[async_trait]
pub trait RegistrationApi: Send + Sync + std::fmt::Debug {
    /// Check whether a customer is registered. The phone number is expected
    /// to be normalized by the caller before it reaches this seam.
    async fn check_registration(&self, phone_number: &str) -> Result<Value, DomainError>;
}

/// Customer orders lookup (downstream service 2).
#[async_trait]
pub trait OrdersApi: Send + Sync + std::fmt::Debug {
    async fn fetch_orders(&self, phone_number: &str) -> Result<Value, DomainError>;
}
