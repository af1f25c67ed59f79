//! Application state for shared services

use std::sync::Arc;

use crate::domain::WorkflowRunner;
use crate::infrastructure::WorkflowDispatcher;

/// Shared handles the HTTP handlers need: the runner for synchronous
/// execution and the dispatcher for queued execution.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<WorkflowRunner>,
    pub dispatcher: Arc<WorkflowDispatcher>,
}

impl AppState {
    pub fn new(runner: Arc<WorkflowRunner>, dispatcher: Arc<WorkflowDispatcher>) -> Self {
        Self { runner, dispatcher }
    }
}
