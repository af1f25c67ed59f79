//! Domain layer - Core business logic and entities

pub mod apis;
pub mod error;
pub mod workflow;

pub use apis::{OrdersApi, RegistrationApi};
pub use error::DomainError;
pub use workflow::{
    classify_intent, ContextKey, CustomerIdentity, ExecutionContext, FinalStatus, Intent,
    IntentAction, IntentOutput, Pipeline, StepResult, StepStatus, TraceEntry, WorkflowError,
    WorkflowOutcome, WorkflowRequest, WorkflowRunner, WorkflowStatus, WorkflowStep,
};
