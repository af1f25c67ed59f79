//! Workflow domain module
//!
//! The fixed nine-stage customer-support pipeline and everything it needs:
//! the mutable per-run [`ExecutionContext`], the [`WorkflowStep`] contract,
//! the stage implementations, the [`WorkflowRunner`] that drives one run to a
//! [`WorkflowOutcome`], and read-only trace renderers.
//!
//! Execution is strictly sequential: stages run in order, the first failure
//! or fault short-circuits the rest, and every executed stage leaves exactly
//! one trace entry.

mod agent;
mod context;
mod error;
mod runner;
mod step;
mod steps;
pub mod visualizer;

pub use agent::{classify_intent, Intent, IntentAction, IntentOutput};
pub use context::{ContextKey, ExecutionContext};
pub use error::WorkflowError;
pub use runner::{
    Pipeline, StepStatus, TraceEntry, WorkflowOutcome, WorkflowRunner, WorkflowStatus,
};
pub use step::{CustomerIdentity, FinalStatus, StepResult, WorkflowRequest, WorkflowStep};
pub use steps::normalize_phone;
