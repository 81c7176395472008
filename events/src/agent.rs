//! Agent lifecycle events pushed by the backend while a voice agent session runs.
//!
//! The wire format is a flat JSON object with an `event_type` discriminant:
//!
//! ```json
//! {"event_type":"agent_started","session_id":"s1","bot_id":"b1","status":"joining",
//!  "timestamp":"2026-01-01T00:00:00Z","meeting_url":"https://meet.google.com/abc"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant value for [`AgentEvent::Started`].
pub const AGENT_STARTED: &str = "agent_started";
/// Discriminant value for [`AgentEvent::GoalCompleted`].
pub const GOAL_COMPLETED: &str = "goal_completed";

/// Every `event_type` value recognized as an agent lifecycle event.
pub const AGENT_EVENT_TYPES: [&str; 2] = [AGENT_STARTED, GOAL_COMPLETED];

/// Name of the discriminant field shared by all agent events.
pub const EVENT_TYPE_FIELD: &str = "event_type";

/// Backend-side state of an agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Joining,
    Active,
    Completed,
    Failed,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Joining => "joining",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Unknown => "unknown",
        }
    }
}

/// Payload of an `agent_started` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStarted {
    pub session_id: String,
    pub bot_id: String,
    pub status: SessionStatus,
    pub timestamp: String,
    pub meeting_url: String,
}

/// Payload of a `goal_completed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCompleted {
    pub session_id: String,
    pub bot_id: String,
    pub status: SessionStatus,
    pub timestamp: String,
    pub outcome: String,
    pub summary: String,
}

/// An agent lifecycle event, narrowed on its `event_type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum AgentEvent {
    #[serde(rename = "agent_started")]
    Started(AgentStarted),
    #[serde(rename = "goal_completed")]
    GoalCompleted(GoalCompleted),
}

impl AgentEvent {
    /// Builds a typed event from a decoded JSON value.
    ///
    /// Returns `None` when the discriminant is unknown or when a field required
    /// by that particular variant is missing or mistyped.
    pub fn from_value(value: &Value) -> Option<Self> {
        AgentEvent::deserialize(value).ok()
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::Started(_) => AGENT_STARTED,
            AgentEvent::GoalCompleted(_) => GOAL_COMPLETED,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            AgentEvent::Started(e) => &e.session_id,
            AgentEvent::GoalCompleted(e) => &e.session_id,
        }
    }

    pub fn bot_id(&self) -> &str {
        match self {
            AgentEvent::Started(e) => &e.bot_id,
            AgentEvent::GoalCompleted(e) => &e.bot_id,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            AgentEvent::Started(e) => e.status,
            AgentEvent::GoalCompleted(e) => e.status,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            AgentEvent::Started(e) => &e.timestamp,
            AgentEvent::GoalCompleted(e) => &e.timestamp,
        }
    }
}
