//! Workflow runner: ordered stage execution, trace accumulation, outcome
//!
//! The runner owns the execution context and trace for exactly one run and
//! hands the caller an immutable [`WorkflowOutcome`] snapshot. It never
//! returns an error: stage-reported failures and stage faults both terminate
//! the run early and are expressed in the outcome.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use super::context::ExecutionContext;
use super::step::{CustomerIdentity, FinalStatus, WorkflowRequest, WorkflowStep};
use super::steps::{
    CheckCustomerRegistration, ClassifyIntent, ConditionalRouting, DeriveIntermediateValue,
    FetchCustomerOrders, InitializeContext, MergeFinalContext, Terminate, WebhookTriggered,
};
use crate::domain::apis::{OrdersApi, RegistrationApi};

/// Execution status of one traced stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// One entry of the execution trace, appended per executed stage and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub step_number: usize,
    pub step_name: String,
    pub status: StepStatus,
    pub details: Map<String, Value>,
    pub duration_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl TraceEntry {
    fn new(
        step_number: usize,
        step_name: &str,
        status: StepStatus,
        details: Map<String, Value>,
        duration_ms: f64,
    ) -> Self {
        Self {
            step_number,
            step_name: step_name.to_string(),
            status,
            details,
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Terminal status of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Completed,
    Failed,
}

/// Immutable snapshot of a finished run, returned to the caller.
///
/// On failure the `globals` snapshot and `final_status` are omitted from the
/// JSON form; the log and trace always carry the diagnostic detail.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_status: Option<FinalStatus>,
    #[serde(rename = "globals", skip_serializing_if = "Option::is_none")]
    pub context_snapshot: Option<Map<String, Value>>,
    pub logs: Vec<String>,
    pub trace: Vec<TraceEntry>,
}

impl WorkflowOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

/// The fixed, ordered list of stages. Built once at startup; the stage list
/// is known at build time and is not extensible at runtime.
pub struct Pipeline {
    steps: Vec<Box<dyn WorkflowStep>>,
}

impl Pipeline {
    pub(crate) fn new(steps: Vec<Box<dyn WorkflowStep>>) -> Self {
        Self { steps }
    }

    /// The nine-stage customer-support pipeline.
    pub fn standard(registration: Arc<dyn RegistrationApi>, orders: Arc<dyn OrdersApi>) -> Self {
        Self::new(vec![
            Box::new(WebhookTriggered),
            Box::new(InitializeContext),
            Box::new(CheckCustomerRegistration::new(registration)),
            Box::new(DeriveIntermediateValue),
            Box::new(FetchCustomerOrders::new(orders)),
            Box::new(MergeFinalContext),
            Box::new(ClassifyIntent),
            Box::new(ConditionalRouting),
            Box::new(Terminate),
        ])
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Executes the pipeline for one workflow run at a time.
///
/// Concurrent runs share only this immutable runner; each call to [`run`]
/// owns a fresh context and trace.
///
/// [`run`]: WorkflowRunner::run
pub struct WorkflowRunner {
    pipeline: Pipeline,
}

impl WorkflowRunner {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Run every stage in order, halting at the first failure or fault.
    ///
    /// Never returns an error; every run terminates in a well-formed outcome.
    pub async fn run(
        &self,
        workflow_id: &str,
        identity: CustomerIdentity,
        event: Value,
    ) -> WorkflowOutcome {
        let request = WorkflowRequest::new(workflow_id, identity, event);
        let mut ctx = ExecutionContext::new();
        let mut trace: Vec<TraceEntry> = Vec::with_capacity(self.pipeline.len());
        let mut final_status: Option<FinalStatus> = None;

        for (index, step) in self.pipeline.steps.iter().enumerate() {
            let step_number = index + 1;
            let started = Instant::now();
            let invocation = step.run(&request, &mut ctx).await;
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

            match invocation {
                Err(fault) => {
                    let message = fault.to_string();
                    error!(
                        workflow_id = %request.workflow_id,
                        stage = step.name(),
                        error = %message,
                        "stage fault"
                    );
                    ctx.log(format!("{} error: {}", step.name(), message));

                    let mut details = Map::new();
                    details.insert("exception".to_string(), json!(message));
                    trace.push(TraceEntry::new(
                        step_number,
                        step.name(),
                        StepStatus::Failed,
                        details,
                        duration_ms,
                    ));

                    let (_, logs) = ctx.into_parts();
                    return WorkflowOutcome {
                        workflow_id: request.workflow_id,
                        status: WorkflowStatus::Failed,
                        reason: Some("exception".to_string()),
                        error: Some(message),
                        final_status: None,
                        context_snapshot: None,
                        logs,
                        trace,
                    };
                }
                Ok(result) if !result.success() => {
                    let reason = result.reason().unwrap_or("unknown").to_string();
                    let error = result.error().map(str::to_string);
                    warn!(
                        workflow_id = %request.workflow_id,
                        stage = step.name(),
                        reason = %reason,
                        "stage reported failure"
                    );

                    let mut details = Map::new();
                    details.insert("reason".to_string(), json!(reason));
                    if let Some(err) = &error {
                        details.insert("error".to_string(), json!(err));
                    }
                    trace.push(TraceEntry::new(
                        step_number,
                        step.name(),
                        StepStatus::Failed,
                        details,
                        duration_ms,
                    ));

                    let (_, logs) = ctx.into_parts();
                    return WorkflowOutcome {
                        workflow_id: request.workflow_id,
                        status: WorkflowStatus::Failed,
                        reason: Some(reason),
                        error,
                        final_status: None,
                        context_snapshot: None,
                        logs,
                        trace,
                    };
                }
                Ok(result) => {
                    let mut details = Map::new();
                    if let Some(data) = result.data() {
                        details.extend(data.clone());
                    }
                    if let Some(status) = result.final_status() {
                        final_status = Some(status);
                        details.insert("branch".to_string(), json!(status.as_str()));
                    }
                    debug!(
                        workflow_id = %request.workflow_id,
                        stage = step.name(),
                        duration_ms,
                        "stage completed"
                    );
                    trace.push(TraceEntry::new(
                        step_number,
                        step.name(),
                        StepStatus::Completed,
                        details,
                        duration_ms,
                    ));
                }
            }
        }

        let (snapshot, logs) = ctx.into_parts();
        WorkflowOutcome {
            workflow_id: request.workflow_id,
            status: WorkflowStatus::Completed,
            reason: None,
            error: None,
            final_status,
            context_snapshot: Some(snapshot),
            logs,
            trace,
        }
    }
}
