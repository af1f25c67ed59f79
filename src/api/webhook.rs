//! Event ingress: queued and synchronous workflow execution

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::CustomerIdentity;

/// Inbound customer event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    pub customer_id: String,
    pub customer_phone_number: String,
    #[serde(default)]
    pub event: Value,
}

impl WebhookRequest {
    fn identity(&self) -> CustomerIdentity {
        CustomerIdentity::new(&self.customer_id, &self.customer_phone_number)
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookAccepted {
    pub status: &'static str,
    pub message: &'static str,
    pub workflow_id: String,
}

/// `POST /webhook` - acknowledge the event and queue the pipeline.
///
/// The workflow id is minted here so the caller can correlate logs even
/// though execution happens later on a background task.
pub async fn enqueue_webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let workflow_id = Uuid::new_v4().to_string();
    info!(%workflow_id, customer_id = %payload.customer_id, "queueing workflow");

    // Dropping the handle does not cancel the spawned run.
    let _ = state
        .dispatcher
        .dispatch(workflow_id.clone(), payload.identity(), payload.event);

    Ok((
        StatusCode::ACCEPTED,
        Json(WebhookAccepted {
            status: "accepted",
            message: "workflow queued",
            workflow_id,
        }),
    ))
}

/// `POST /workflows/run` - run the pipeline inline and return the outcome.
pub async fn run_workflow(
    State(state): State<AppState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let workflow_id = Uuid::new_v4().to_string();
    let outcome = state
        .runner
        .run(&workflow_id, payload.identity(), payload.event)
        .await;

    Ok((StatusCode::OK, Json(outcome)))
}
