//! Rule-based intent classifier
//!
//! A hardcoded keyword matcher standing in for a future model-backed agent.
//! The rules are deliberately simple and deterministic: lowercase the
//! message, match substrings, fall through to a generic response.

use serde::{Deserialize, Serialize};

/// What the classifier decided the customer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RefundRequest,
    OrderStatus,
    GeneralQuery,
}

/// What the routing stage should do with the classified message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentAction {
    RouteToRefunds,
    FetchStatus,
    RespondWithInfo,
}

/// Classifier output stored in the context for the routing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOutput {
    pub intent: Intent,
    pub confidence: f64,
    pub action: IntentAction,
}

/// Classify a customer message with the fixed keyword rules.
pub fn classify_intent(customer_message: &str) -> IntentOutput {
    let msg = customer_message.to_lowercase();

    if msg.contains("refund") || msg.contains("return") {
        IntentOutput {
            intent: Intent::RefundRequest,
            confidence: 0.98,
            action: IntentAction::RouteToRefunds,
        }
    } else if msg.contains("status") || msg.contains("where is my order") {
        IntentOutput {
            intent: Intent::OrderStatus,
            confidence: 0.95,
            action: IntentAction::FetchStatus,
        }
    } else {
        IntentOutput {
            intent: Intent::GeneralQuery,
            confidence: 0.6,
            action: IntentAction::RespondWithInfo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refund_keywords() {
        let output = classify_intent("I want a refund");
        assert_eq!(output.intent, Intent::RefundRequest);
        assert_eq!(output.action, IntentAction::RouteToRefunds);
        assert_eq!(output.confidence, 0.98);

        let output = classify_intent("can I return this?");
        assert_eq!(output.action, IntentAction::RouteToRefunds);
    }

    #[test]
    fn test_status_keywords() {
        let output = classify_intent("what's my order status?");
        assert_eq!(output.intent, Intent::OrderStatus);
        assert_eq!(output.action, IntentAction::FetchStatus);
        assert_eq!(output.confidence, 0.95);

        let output = classify_intent("Where is my order");
        assert_eq!(output.action, IntentAction::FetchStatus);
    }

    #[test]
    fn test_fallback() {
        let output = classify_intent("hello there");
        assert_eq!(output.intent, Intent::GeneralQuery);
        assert_eq!(output.action, IntentAction::RespondWithInfo);
        assert_eq!(output.confidence, 0.6);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let output = classify_intent("REFUND ME NOW");
        assert_eq!(output.action, IntentAction::RouteToRefunds);
    }

    #[test]
    fn test_refund_wins_over_status() {
        // First matching rule applies, as in the original matcher.
        let output = classify_intent("refund status please");
        assert_eq!(output.action, IntentAction::RouteToRefunds);
    }

    #[test]
    fn test_empty_message() {
        let output = classify_intent("");
        assert_eq!(output.action, IntentAction::RespondWithInfo);
    }

    #[test]
    fn test_output_serialization() {
        let output = classify_intent("refund please");
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "intent": "refund_request",
                "confidence": 0.98,
                "action": "route_to_refunds"
            })
        );
    }
}
