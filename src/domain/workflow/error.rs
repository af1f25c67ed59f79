//! Workflow error types

use thiserror::Error;

/// Unexpected faults raised during stage invocation.
///
/// A stage that can anticipate a failure reports it through
/// [`StepResult::fail`](super::StepResult::fail); an `Err` of this type is the
/// fault channel the runner converts into a failed outcome with reason
/// `"exception"`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Context key '{0}' not set by any earlier stage")]
    MissingContextKey(String),

    #[error("Invalid stage payload: {0}")]
    InvalidPayload(String),

    #[error("Stage '{stage}' failed unexpectedly: {message}")]
    StageFault { stage: String, message: String },
}

impl WorkflowError {
    pub fn missing_context_key(key: impl Into<String>) -> Self {
        Self::MissingContextKey(key.into())
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    pub fn stage_fault(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFault {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::missing_context_key("intermediate_value");
        assert_eq!(
            err.to_string(),
            "Context key 'intermediate_value' not set by any earlier stage"
        );

        let err = WorkflowError::stage_fault("Run Agent", "payload was not an object");
        assert_eq!(
            err.to_string(),
            "Stage 'Run Agent' failed unexpectedly: payload was not an object"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = WorkflowError::missing_context_key("orders_response");
        let err2 = WorkflowError::missing_context_key("orders_response");
        assert_eq!(err1, err2);
    }
}
