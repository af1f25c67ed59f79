//! Queued workflow execution with whole-pipeline retry
//!
//! The webhook handler acknowledges the event immediately and hands it to
//! the dispatcher, which runs the pipeline on a background task. The runner
//! itself never returns an error, so the only thing left to retry at this
//! level is a panic somewhere inside a run: the whole pipeline is re-run
//! from stage 1 with exponential backoff, at-least-once.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{CustomerIdentity, WorkflowOutcome, WorkflowRunner};

pub struct WorkflowDispatcher {
    runner: Arc<WorkflowRunner>,
    max_retries: u32,
}

impl WorkflowDispatcher {
    pub fn new(runner: Arc<WorkflowRunner>, max_retries: u32) -> Self {
        Self {
            runner,
            max_retries,
        }
    }

    /// Queue one workflow run. Returns immediately; the handle resolves to
    /// the outcome, or `None` if every attempt panicked.
    pub fn dispatch(
        &self,
        workflow_id: String,
        identity: CustomerIdentity,
        event: Value,
    ) -> JoinHandle<Option<WorkflowOutcome>> {
        let runner = self.runner.clone();
        let max_retries = self.max_retries;

        tokio::spawn(async move {
            for attempt in 0..=max_retries {
                let run = {
                    let runner = runner.clone();
                    let workflow_id = workflow_id.clone();
                    let identity = identity.clone();
                    let event = event.clone();
                    tokio::spawn(
                        async move { runner.run(&workflow_id, identity, event).await },
                    )
                };

                match run.await {
                    Ok(outcome) => {
                        info!(
                            workflow_id = %outcome.workflow_id,
                            status = ?outcome.status,
                            attempt,
                            "workflow run finished"
                        );
                        return Some(outcome);
                    }
                    Err(join_error) => {
                        if attempt == max_retries {
                            error!(
                                %workflow_id,
                                attempt,
                                error = %join_error,
                                "workflow run panicked, retries exhausted"
                            );
                            return None;
                        }
                        let backoff = Duration::from_secs(1u64 << attempt);
                        warn!(
                            %workflow_id,
                            attempt,
                            backoff_secs = backoff.as_secs(),
                            error = %join_error,
                            "workflow run panicked, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::apis::mock::{MockOrdersApi, MockRegistrationApi};
    use crate::domain::workflow::{
        ExecutionContext, Pipeline, StepResult, WorkflowError, WorkflowRequest, WorkflowStatus,
        WorkflowStep,
    };

    fn identity() -> CustomerIdentity {
        CustomerIdentity::new("customer-1", "+923001234567")
    }

    #[tokio::test]
    async fn test_dispatch_runs_workflow_in_background() {
        let runner = Arc::new(WorkflowRunner::new(Pipeline::standard(
            Arc::new(MockRegistrationApi::new()),
            Arc::new(MockOrdersApi::new()),
        )));
        let dispatcher = WorkflowDispatcher::new(runner, 3);

        let handle = dispatcher.dispatch(
            "wf-queued".to_string(),
            identity(),
            json!({"message": "refund"}),
        );
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(outcome.workflow_id, "wf-queued");
        assert_eq!(outcome.status, WorkflowStatus::Completed);
    }

    /// Panics on the first N invocations, then succeeds.
    struct FlakyStep {
        panics_remaining: AtomicU32,
    }

    #[async_trait]
    impl WorkflowStep for FlakyStep {
        fn name(&self) -> &'static str {
            "Flaky Stage"
        }

        async fn run(
            &self,
            _request: &WorkflowRequest,
            _ctx: &mut ExecutionContext,
        ) -> Result<StepResult, WorkflowError> {
            if self
                .panics_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                panic!("transient fault");
            }
            Ok(StepResult::ok())
        }
    }

    fn flaky_runner(panics: u32) -> Arc<WorkflowRunner> {
        Arc::new(WorkflowRunner::new(Pipeline::new(vec![Box::new(
            FlakyStep {
                panics_remaining: AtomicU32::new(panics),
            },
        )])))
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_run_is_retried_from_the_start() {
        let dispatcher = WorkflowDispatcher::new(flaky_runner(2), 3);

        let handle =
            dispatcher.dispatch("wf-flaky".to_string(), identity(), json!({"message": "hi"}));
        let outcome = handle.await.unwrap().unwrap();

        // Third attempt succeeded.
        assert_eq!(outcome.status, WorkflowStatus::Completed);
        assert_eq!(outcome.trace.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let dispatcher = WorkflowDispatcher::new(flaky_runner(u32::MAX), 3);

        let handle =
            dispatcher.dispatch("wf-doomed".to_string(), identity(), json!({"message": "hi"}));
        assert!(handle.await.unwrap().is_none());
    }
}
