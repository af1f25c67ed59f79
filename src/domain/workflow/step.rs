//! Stage contracts: the unified step signature and its result type

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::context::ExecutionContext;
use super::error::WorkflowError;

/// Who the workflow is running for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub customer_id: String,
    pub phone_number: String,
}

impl CustomerIdentity {
    pub fn new(customer_id: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            phone_number: phone_number.into(),
        }
    }
}

/// The immutable inputs every stage receives.
///
/// All stages share this one shape; per-run mutable state lives in the
/// [`ExecutionContext`] instead.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub workflow_id: String,
    pub identity: CustomerIdentity,
    pub event: Value,
}

impl WorkflowRequest {
    pub fn new(workflow_id: impl Into<String>, identity: CustomerIdentity, event: Value) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            identity,
            event,
        }
    }
}

/// The routing decision produced by the conditional-routing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    RoutedToRefunds,
    OrderStatusReturned,
    AutoResponded,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoutedToRefunds => "routed_to_refunds",
            Self::OrderStatusReturned => "order_status_returned",
            Self::AutoResponded => "auto_responded",
        }
    }
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage invocation.
///
/// Constructed only through [`StepResult::ok`], [`StepResult::ok_with`] and
/// [`StepResult::fail`], so a successful result can never carry an error and
/// a failed result always carries one.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_status: Option<FinalStatus>,
}

impl StepResult {
    /// A successful stage with nothing to report beyond its context writes.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            reason: None,
            final_status: None,
        }
    }

    /// A successful stage carrying a data payload.
    pub fn ok_with(data: Map<String, Value>) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    /// A stage-reported failure with a machine-readable reason code.
    pub fn fail(reason: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            reason: Some(reason.into()),
            final_status: None,
        }
    }

    /// Attach the routing decision (only the conditional-routing stage does).
    pub fn with_final_status(mut self, status: FinalStatus) -> Self {
        self.final_status = Some(status);
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn final_status(&self) -> Option<FinalStatus> {
        self.final_status
    }
}

/// One named unit of work in the fixed pipeline.
///
/// Stages are stateless between invocations; all run state lives in the
/// context. Returning `Err` signals an unexpected fault, which the runner
/// converts into a failed outcome with reason `"exception"` - it never
/// propagates past the runner.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    /// Display name used in logs and the execution trace.
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError>;
}
