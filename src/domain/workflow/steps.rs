//! The nine fixed pipeline stages
//!
//! Each stage documents the context keys it reads and writes; the runner
//! guarantees stages execute in order, so a stage may rely on every earlier
//! stage's writes being present.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::agent::{classify_intent, IntentAction, IntentOutput};
use super::context::{ContextKey, ExecutionContext};
use super::error::WorkflowError;
use super::step::{FinalStatus, StepResult, WorkflowRequest, WorkflowStep};
use crate::domain::apis::{OrdersApi, RegistrationApi};

/// Rewrite a leading `+92` country prefix to the local `0` form.
pub fn normalize_phone(phone_number: &str) -> String {
    match phone_number.strip_prefix("+92") {
        Some(rest) => format!("0{rest}"),
        None => phone_number.to_string(),
    }
}

/// Stage 1: log that the webhook fired. Reads and writes nothing.
pub struct WebhookTriggered;

#[async_trait]
impl WorkflowStep for WebhookTriggered {
    fn name(&self) -> &'static str {
        "Webhook Triggered"
    }

    async fn run(
        &self,
        _request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        ctx.log("Step 1: webhook triggered");
        Ok(StepResult::ok())
    }
}

/// Stage 2: seed the context with the customer identity and raw event.
///
/// Writes `customer_identity` and `received_event`.
pub struct InitializeContext;

#[async_trait]
impl WorkflowStep for InitializeContext {
    fn name(&self) -> &'static str {
        "Initialize Context"
    }

    async fn run(
        &self,
        request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let identity = serde_json::to_value(&request.identity)
            .map_err(|e| WorkflowError::stage_fault(self.name(), e.to_string()))?;

        ctx.insert(ContextKey::CustomerIdentity, identity);
        ctx.insert(ContextKey::ReceivedEvent, request.event.clone());
        ctx.log("Step 2: initial context set");
        Ok(StepResult::ok())
    }
}

/// Stage 3: call the customer-registration service.
///
/// Reads the phone number (normalized first), writes `registration_response`.
/// A downstream failure is a stage-reported failure, not a fault.
pub struct CheckCustomerRegistration {
    api: Arc<dyn RegistrationApi>,
}

impl CheckCustomerRegistration {
    pub fn new(api: Arc<dyn RegistrationApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WorkflowStep for CheckCustomerRegistration {
    fn name(&self) -> &'static str {
        "Check Customer Registration"
    }

    async fn run(
        &self,
        request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let phone = normalize_phone(&request.identity.phone_number);

        match self.api.check_registration(&phone).await {
            Ok(response) => {
                ctx.insert(ContextKey::RegistrationResponse, response);
                ctx.log("Step 3: registration check succeeded");
                Ok(StepResult::ok())
            }
            Err(e) => {
                ctx.log(format!("Step 3 failed: {e}"));
                Ok(StepResult::fail(
                    "CHECK_CUSTOMER_REGISTRATION_API_FAILED",
                    e.to_string(),
                ))
            }
        }
    }
}

/// Stage 4: derive the intermediate value from the registration response.
///
/// Reads `registration_response`, writes `intermediate_value`.
pub struct DeriveIntermediateValue;

#[async_trait]
impl WorkflowStep for DeriveIntermediateValue {
    fn name(&self) -> &'static str {
        "Derive Intermediate Value"
    }

    async fn run(
        &self,
        _request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let from_registration = ctx
            .get(ContextKey::RegistrationResponse)
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null);

        ctx.insert(
            ContextKey::IntermediateValue,
            json!({ "from_registration": from_registration }),
        );
        ctx.log("Step 4: derived intermediate value");
        Ok(StepResult::ok())
    }
}

/// Stage 5: call the customer-orders service.
///
/// Reads the phone number, writes `orders_response`. A downstream failure is
/// a stage-reported failure with reason `FETCH_CUSTOMER_ORDERS_API_FAILED`.
pub struct FetchCustomerOrders {
    api: Arc<dyn OrdersApi>,
}

impl FetchCustomerOrders {
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WorkflowStep for FetchCustomerOrders {
    fn name(&self) -> &'static str {
        "Fetch Customer Orders"
    }

    async fn run(
        &self,
        request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        match self.api.fetch_orders(&request.identity.phone_number).await {
            Ok(response) => {
                ctx.insert(ContextKey::OrdersResponse, response);
                ctx.log("Step 5: orders fetch succeeded");
                Ok(StepResult::ok())
            }
            Err(e) => {
                ctx.log(format!("Step 5 failed: {e}"));
                Ok(StepResult::fail(
                    "FETCH_CUSTOMER_ORDERS_API_FAILED",
                    e.to_string(),
                ))
            }
        }
    }
}

/// Stage 6: merge both downstream responses into the final context.
///
/// Reads `registration_response` and `orders_response` (both are hard
/// preconditions), writes `final_context`.
pub struct MergeFinalContext;

#[async_trait]
impl WorkflowStep for MergeFinalContext {
    fn name(&self) -> &'static str {
        "Merge Final Context"
    }

    async fn run(
        &self,
        _request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let registration = ctx.require(ContextKey::RegistrationResponse)?.clone();
        let orders = ctx.require(ContextKey::OrdersResponse)?.clone();

        ctx.insert(
            ContextKey::FinalContext,
            json!({
                "registration": registration,
                "orders": orders,
            }),
        );
        ctx.log("Step 6: set final context");
        Ok(StepResult::ok())
    }
}

/// Stage 7: classify the customer message with the hardcoded rule matcher.
///
/// Reads `event.message`, writes `intent_output` and carries the same
/// payload on its result so the trace records what was classified. The
/// classifier is a pure rule match and cannot report failure.
pub struct ClassifyIntent;

#[async_trait]
impl WorkflowStep for ClassifyIntent {
    fn name(&self) -> &'static str {
        "Classify Intent"
    }

    async fn run(
        &self,
        request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let message = request
            .event
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("");

        let output = classify_intent(message);
        let payload = match serde_json::to_value(&output) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(WorkflowError::stage_fault(
                    self.name(),
                    format!("classifier payload was not an object: {other}"),
                ))
            }
            Err(e) => return Err(WorkflowError::stage_fault(self.name(), e.to_string())),
        };

        ctx.insert(ContextKey::IntentOutput, Value::Object(payload.clone()));
        ctx.log("Step 7: agent executed (hardcoded)");
        Ok(StepResult::ok_with(payload))
    }
}

/// Stage 8: route on the classifier's action.
///
/// Reads `intent_output.action`, attaches the `final_status` to its result.
pub struct ConditionalRouting;

#[async_trait]
impl WorkflowStep for ConditionalRouting {
    fn name(&self) -> &'static str {
        "Conditional Routing"
    }

    async fn run(
        &self,
        _request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        let payload = ctx.require(ContextKey::IntentOutput)?.clone();
        let output: IntentOutput = serde_json::from_value(payload)
            .map_err(|e| WorkflowError::invalid_payload(e.to_string()))?;

        let final_status = match output.action {
            IntentAction::RouteToRefunds => {
                ctx.log("Step 8: routing to refunds");
                FinalStatus::RoutedToRefunds
            }
            IntentAction::FetchStatus => {
                ctx.log("Step 8: fetching order status");
                FinalStatus::OrderStatusReturned
            }
            IntentAction::RespondWithInfo => {
                ctx.log("Step 8: auto-responding");
                FinalStatus::AutoResponded
            }
        };

        Ok(StepResult::ok().with_final_status(final_status))
    }
}

/// Stage 9: log termination. Reads and writes nothing.
pub struct Terminate;

#[async_trait]
impl WorkflowStep for Terminate {
    fn name(&self) -> &'static str {
        "Terminate"
    }

    async fn run(
        &self,
        _request: &WorkflowRequest,
        ctx: &mut ExecutionContext,
    ) -> Result<StepResult, WorkflowError> {
        ctx.log("Step 9: terminate");
        Ok(StepResult::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::apis::mock::{MockOrdersApi, MockRegistrationApi};
    use crate::domain::workflow::step::CustomerIdentity;

    fn request() -> WorkflowRequest {
        WorkflowRequest::new(
            "wf-1",
            CustomerIdentity::new("customer-1", "+923001234567"),
            json!({"message": "I want a refund"}),
        )
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+923001234567"), "03001234567");
        assert_eq!(normalize_phone("03001234567"), "03001234567");
        assert_eq!(normalize_phone("+13001234567"), "+13001234567");
        assert_eq!(normalize_phone(""), "");
    }

    #[tokio::test]
    async fn test_webhook_triggered_logs_only() {
        let mut ctx = ExecutionContext::new();
        let result = WebhookTriggered.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(ctx.log_lines(), ["Step 1: webhook triggered"]);
        assert!(ctx.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_context_seeds_identity_and_event() {
        let mut ctx = ExecutionContext::new();
        let result = InitializeContext.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(
            ctx.get(ContextKey::CustomerIdentity).unwrap()["customer_id"],
            json!("customer-1")
        );
        assert_eq!(
            ctx.get(ContextKey::ReceivedEvent).unwrap()["message"],
            json!("I want a refund")
        );
    }

    #[tokio::test]
    async fn test_registration_check_normalizes_phone() {
        let api = Arc::new(MockRegistrationApi::new());
        let step = CheckCustomerRegistration::new(api.clone());
        let mut ctx = ExecutionContext::new();

        let result = step.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(api.calls(), ["03001234567"]);
        assert!(ctx.contains(ContextKey::RegistrationResponse));
    }

    #[tokio::test]
    async fn test_registration_check_reports_downstream_failure() {
        let api = Arc::new(MockRegistrationApi::new().with_error("connection refused"));
        let step = CheckCustomerRegistration::new(api);
        let mut ctx = ExecutionContext::new();

        let result = step.run(&request(), &mut ctx).await.unwrap();

        assert!(!result.success());
        assert_eq!(
            result.reason(),
            Some("CHECK_CUSTOMER_REGISTRATION_API_FAILED")
        );
        assert!(result.error().unwrap().contains("connection refused"));
        assert!(!ctx.contains(ContextKey::RegistrationResponse));
        assert!(ctx.log_lines()[0].starts_with("Step 3 failed:"));
    }

    #[tokio::test]
    async fn test_derive_intermediate_value() {
        let mut ctx = ExecutionContext::new();
        ctx.insert(ContextKey::RegistrationResponse, json!({"value": "v1"}));

        let result = DeriveIntermediateValue.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(
            ctx.get(ContextKey::IntermediateValue).unwrap(),
            &json!({"from_registration": "v1"})
        );
    }

    #[tokio::test]
    async fn test_derive_intermediate_value_without_value_field() {
        let mut ctx = ExecutionContext::new();
        ctx.insert(ContextKey::RegistrationResponse, json!({"registered": false}));

        DeriveIntermediateValue.run(&request(), &mut ctx).await.unwrap();

        assert_eq!(
            ctx.get(ContextKey::IntermediateValue).unwrap(),
            &json!({"from_registration": null})
        );
    }

    #[tokio::test]
    async fn test_orders_fetch_uses_raw_phone() {
        let api = Arc::new(MockOrdersApi::new());
        let step = FetchCustomerOrders::new(api.clone());
        let mut ctx = ExecutionContext::new();

        let result = step.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(api.calls(), ["+923001234567"]);
        assert!(ctx.contains(ContextKey::OrdersResponse));
    }

    #[tokio::test]
    async fn test_orders_fetch_reports_downstream_failure() {
        let api = Arc::new(MockOrdersApi::new().with_error("HTTP 503"));
        let step = FetchCustomerOrders::new(api);
        let mut ctx = ExecutionContext::new();

        let result = step.run(&request(), &mut ctx).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.reason(), Some("FETCH_CUSTOMER_ORDERS_API_FAILED"));
    }

    #[tokio::test]
    async fn test_merge_final_context() {
        let mut ctx = ExecutionContext::new();
        ctx.insert(ContextKey::RegistrationResponse, json!({"value": "v1"}));
        ctx.insert(ContextKey::OrdersResponse, json!({"orders": [1, 2]}));

        MergeFinalContext.run(&request(), &mut ctx).await.unwrap();

        assert_eq!(
            ctx.get(ContextKey::FinalContext).unwrap(),
            &json!({
                "registration": {"value": "v1"},
                "orders": {"orders": [1, 2]},
            })
        );
    }

    #[tokio::test]
    async fn test_merge_final_context_faults_on_missing_precondition() {
        let mut ctx = ExecutionContext::new();
        ctx.insert(ContextKey::RegistrationResponse, json!({"value": "v1"}));

        let err = MergeFinalContext.run(&request(), &mut ctx).await.unwrap_err();
        assert_eq!(err, WorkflowError::missing_context_key("orders_response"));
    }

    #[tokio::test]
    async fn test_classify_intent_writes_output() {
        let mut ctx = ExecutionContext::new();
        ClassifyIntent.run(&request(), &mut ctx).await.unwrap();

        assert_eq!(
            ctx.get(ContextKey::IntentOutput).unwrap()["action"],
            json!("route_to_refunds")
        );
    }

    #[tokio::test]
    async fn test_classify_intent_carries_payload_on_result() {
        let mut ctx = ExecutionContext::new();
        let result = ClassifyIntent.run(&request(), &mut ctx).await.unwrap();

        let data = result.data().unwrap();
        assert_eq!(data.get("intent"), Some(&json!("refund_request")));
        assert_eq!(data.get("action"), Some(&json!("route_to_refunds")));
        assert_eq!(data.get("confidence"), Some(&json!(0.98)));
    }

    #[tokio::test]
    async fn test_classify_intent_missing_message_falls_back() {
        let req = WorkflowRequest::new(
            "wf-1",
            CustomerIdentity::new("customer-1", "03001234567"),
            json!({}),
        );
        let mut ctx = ExecutionContext::new();

        ClassifyIntent.run(&req, &mut ctx).await.unwrap();

        assert_eq!(
            ctx.get(ContextKey::IntentOutput).unwrap()["action"],
            json!("respond_with_info")
        );
    }

    #[tokio::test]
    async fn test_conditional_routing_attaches_final_status() {
        let mut ctx = ExecutionContext::new();
        ctx.insert(
            ContextKey::IntentOutput,
            serde_json::to_value(classify_intent("where is my order?")).unwrap(),
        );

        let result = ConditionalRouting.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(result.final_status(), Some(FinalStatus::OrderStatusReturned));
        assert_eq!(ctx.log_lines(), ["Step 8: fetching order status"]);
    }

    #[tokio::test]
    async fn test_conditional_routing_faults_without_intent_output() {
        let mut ctx = ExecutionContext::new();
        let err = ConditionalRouting.run(&request(), &mut ctx).await.unwrap_err();
        assert_eq!(err, WorkflowError::missing_context_key("intent_output"));
    }

    #[tokio::test]
    async fn test_terminate_logs_only() {
        let mut ctx = ExecutionContext::new();
        let result = Terminate.run(&request(), &mut ctx).await.unwrap();

        assert!(result.success());
        assert_eq!(ctx.log_lines(), ["Step 9: terminate"]);
    }
}
