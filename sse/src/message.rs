use crate::error::Error;
use async_trait::async_trait;
use serde_json::Value;

/// One message read from the stream.
///
/// Payloads that parse as JSON arrive decoded; anything else is forwarded
/// as the raw payload text so that non-JSON feeds are never dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Json(Value),
    Text(String),
}

impl StreamMessage {
    pub fn from_payload(payload: String) -> Self {
        match serde_json::from_str(&payload) {
            Ok(value) => StreamMessage::Json(value),
            Err(_) => StreamMessage::Text(payload),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StreamMessage::Json(value) => Some(value),
            StreamMessage::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamMessage::Json(_) => None,
            StreamMessage::Text(text) => Some(text),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::Json(_) => "json",
            StreamMessage::Text(_) => "text",
        }
    }
}

/// Observer for a single subscription.
///
/// Calls are made from the subscription's task, one at a time and in stream
/// order: the next message is not dispatched until `on_message` returns.
/// No method is called after the subscription has been cancelled.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, message: StreamMessage);

    /// Transport failure. A reconnect is scheduled after this returns.
    async fn on_error(&self, _error: &Error) {}

    /// Response headers received, before the first body read.
    async fn on_open(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payloads_are_parsed() {
        assert_eq!(
            StreamMessage::from_payload("{\"a\":1}".to_string()),
            StreamMessage::Json(json!({ "a": 1 }))
        );
        assert_eq!(
            StreamMessage::from_payload("[true, null]".to_string()),
            StreamMessage::Json(json!([true, null]))
        );
        assert_eq!(
            StreamMessage::from_payload("42".to_string()),
            StreamMessage::Json(json!(42))
        );
        assert_eq!(
            StreamMessage::from_payload("\"quoted\"".to_string()),
            StreamMessage::Json(json!("quoted"))
        );
    }

    #[test]
    fn test_out_of_range_numbers_still_parse_as_json() {
        let raw = r#"{"companyProfile":{"name":"Acme"},"osintCompletionPercentage":1e400}"#;
        let message = StreamMessage::from_payload(raw.to_string());

        let value = message.as_json().expect("valid JSON is never forwarded as text");
        assert_eq!(value["companyProfile"]["name"], "Acme");
        assert!(value["osintCompletionPercentage"].is_number());
        assert_eq!(message.kind(), "json");
    }

    #[test]
    fn test_non_json_payloads_pass_through_unchanged() {
        for raw in ["", "hello world", "{broken", "[DONE]", "{\"a\":1} trailing"] {
            let message = StreamMessage::from_payload(raw.to_string());
            assert_eq!(message.as_text(), Some(raw));
            assert_eq!(message.kind(), "text");
        }
    }
}
