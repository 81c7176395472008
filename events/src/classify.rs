//! Discriminates decoded stream messages into known domain events.
//!
//! Classification is layered: the `is_*` predicates answer "does this look
//! like X" without building anything, and [`classify`] narrows a value into a
//! [`DomainEvent`] once the predicates agree. Anything that is a JSON object
//! but not a recognized event is handed back as an opaque record so callers
//! can still show it.

use crate::agent::{AgentEvent, AGENT_EVENT_TYPES, EVENT_TYPE_FIELD};
use crate::osint;
use crate::DomainEvent;
use log::*;
use serde_json::{Map, Value};

/// Result of classifying one decoded message.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A recognized business event.
    Event(DomainEvent),
    /// A JSON object that matched no known event shape.
    Record(Map<String, Value>),
    /// Arrays and primitives.
    Ignored,
}

/// True iff `value` is an object whose `event_type` is a known agent event tag.
pub fn is_agent_event(value: &Value) -> bool {
    value
        .get(EVENT_TYPE_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|tag| AGENT_EVENT_TYPES.contains(&tag))
}

pub fn is_agent_started_event(event: &AgentEvent) -> bool {
    matches!(event, AgentEvent::Started(_))
}

pub fn is_goal_completed_event(event: &AgentEvent) -> bool {
    matches!(event, AgentEvent::GoalCompleted(_))
}

/// True iff `value` carries `companyProfile.name` as a string.
///
/// Only the company name is required so that partial reports still render.
pub fn is_intelligence_report(value: &Value) -> bool {
    value
        .get("companyProfile")
        .filter(|profile| profile.is_object())
        .and_then(|profile| profile.get("name"))
        .is_some_and(Value::is_string)
}

/// True iff `value` is either an agent event or an intelligence report.
///
/// Broader than [`is_agent_event`], which only checks the `event_type`
/// discriminant.
pub fn is_recognized_event(value: &Value) -> bool {
    is_agent_event(value) || is_intelligence_report(value)
}

/// Narrows a decoded message into a [`Classification`].
pub fn classify(value: &Value) -> Classification {
    if is_agent_event(value) {
        if let Some(event) = AgentEvent::from_value(value) {
            return Classification::Event(DomainEvent::Agent(event));
        }
        warn!(
            "Agent event {:?} is missing required fields, passing it through as a record",
            value.get(EVENT_TYPE_FIELD)
        );
    } else if is_intelligence_report(value) {
        return Classification::Event(DomainEvent::IntelligenceReport(osint::coerce(value)));
    }

    match value {
        Value::Object(record) => Classification::Record(record.clone()),
        _ => Classification::Ignored,
    }
}
