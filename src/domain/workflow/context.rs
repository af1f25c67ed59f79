//! Workflow execution context
//!
//! One `ExecutionContext` is created empty at the start of a run, handed
//! `&mut` to each stage in order, and snapshotted into the outcome at the
//! end. Nothing outside the run holds a reference to it, so two concurrent
//! runs can never observe each other's values.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::error::WorkflowError;

/// The fixed set of context slots the nine stages read and write.
///
/// Later stages may read any key written by an earlier stage; write order
/// defines availability. Keeping the keys as an enum (instead of free-form
/// strings) means a stage cannot ask for a slot the pipeline never produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    CustomerIdentity,
    ReceivedEvent,
    RegistrationResponse,
    IntermediateValue,
    OrdersResponse,
    FinalContext,
    IntentOutput,
}

impl ContextKey {
    /// Stable string form used in the `globals` snapshot of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerIdentity => "customer_identity",
            Self::ReceivedEvent => "received_event",
            Self::RegistrationResponse => "registration_response",
            Self::IntermediateValue => "intermediate_value",
            Self::OrdersResponse => "orders_response",
            Self::FinalContext => "final_context",
            Self::IntentOutput => "intent_output",
        }
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state shared across the stages of a single workflow run.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    values: HashMap<ContextKey, Value>,
    log: Vec<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a context key, replacing any earlier value.
    pub fn insert(&mut self, key: ContextKey, value: Value) {
        self.values.insert(key, value);
    }

    /// Get a value written by an earlier stage.
    pub fn get(&self, key: ContextKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// Get a value, faulting if no earlier stage has written it.
    pub fn require(&self, key: ContextKey) -> Result<&Value, WorkflowError> {
        self.get(key)
            .ok_or_else(|| WorkflowError::missing_context_key(key.as_str()))
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Append a human-readable trace line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// String-keyed copy of the values, used for the outcome `globals` field.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.clone()))
            .collect()
    }

    /// Consume the context, returning the snapshot and the accumulated log.
    pub fn into_parts(self) -> (Map<String, Value>, Vec<String>) {
        let snapshot = self.snapshot();
        (snapshot, self.log)
    }
}
