//! Customer care workflow service
//!
//! Runs inbound customer events through a fixed nine-stage pipeline:
//! context initialization, downstream enrichment (registration check and
//! order fetch), rule-based intent classification and routing. Every run
//! produces a replayable trace that the visualizer can render as a tree,
//! a Mermaid diagram, JSON or HTML.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{Pipeline, WorkflowRunner};
use infrastructure::{build_downstream_apis, WorkflowDispatcher};

/// Wire the runner, dispatcher and downstream clients from configuration.
pub fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (registration, orders) = build_downstream_apis(&config.downstream)?;

    let runner = Arc::new(WorkflowRunner::new(Pipeline::standard(
        Arc::new(registration),
        Arc::new(orders),
    )));
    let dispatcher = Arc::new(WorkflowDispatcher::new(
        runner.clone(),
        config.dispatcher.max_retries,
    ));

    Ok(AppState::new(runner, dispatcher))
}
