//! Operator-side view of the voice agent session.
//!
//! The tracker follows one session at a time. Operator actions (starting the
//! agent, a failed start, a reset) and lifecycle events from the stream both
//! move it through `idle → starting → joining → active → completed | failed`.
//! Every change is published on a `watch` channel so a UI or the binary can
//! follow along.

use crate::gateway::agent_api::{SessionStatusResponse, StartAgentResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use events::{AgentEvent, DomainEvent, EventHandler, SessionStatus};
use log::*;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeetStatus {
    #[default]
    Idle,
    Starting,
    Joining,
    Active,
    Completed,
    Failed,
}

impl MeetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetStatus::Idle => "idle",
            MeetStatus::Starting => "starting",
            MeetStatus::Joining => "joining",
            MeetStatus::Active => "active",
            MeetStatus::Completed => "completed",
            MeetStatus::Failed => "failed",
        }
    }
}

impl From<SessionStatus> for MeetStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Pending | SessionStatus::Joining => MeetStatus::Joining,
            SessionStatus::Active => MeetStatus::Active,
            SessionStatus::Completed => MeetStatus::Completed,
            SessionStatus::Failed => MeetStatus::Failed,
            SessionStatus::Unknown => MeetStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentSession {
    pub session_id: String,
    pub bot_id: String,
    pub meeting_url: String,
    pub outcome: Option<String>,
    pub summary: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AgentSession {
    fn new(session_id: &str, bot_id: &str, meeting_url: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            bot_id: bot_id.to_string(),
            meeting_url: meeting_url.to_string(),
            outcome: None,
            summary: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    pub status: MeetStatus,
    pub session: Option<AgentSession>,
    /// Message of the last failed operator action.
    pub error: Option<String>,
}

pub struct AgentSessionTracker {
    state: watch::Sender<TrackerState>,
}

impl AgentSessionTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TrackerState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    /// The operator asked for the agent to join a meeting.
    pub fn begin_start(&self) {
        self.state.send_modify(|state| {
            state.status = MeetStatus::Starting;
            state.session = None;
            state.error = None;
        });
    }

    /// The backend accepted the start request.
    pub fn record_started(&self, response: &StartAgentResponse, meeting_url: &str) {
        info!(
            "Tracking agent session {} ({})",
            response.session_id,
            response.status.as_str()
        );
        self.state.send_modify(|state| {
            state.status = response.status.into();
            state.session = Some(AgentSession::new(
                &response.session_id,
                &response.bot_id,
                meeting_url,
            ));
            state.error = None;
        });
    }

    pub fn record_failure(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("Agent session failed: {message}");
        self.state.send_modify(|state| {
            state.status = MeetStatus::Failed;
            state.error = Some(message);
        });
    }

    /// Apply a polled status for the tracked session. Status for any other
    /// session is ignored.
    pub fn record_status(&self, status: &SessionStatusResponse) {
        self.state.send_if_modified(|state| {
            let Some(session) = state.session.as_mut() else {
                return false;
            };
            if session.session_id != status.session_id {
                return false;
            }
            state.status = status.status.into();
            if status.outcome.is_some() {
                session.outcome = status.outcome.clone();
            }
            if status.summary.is_some() {
                session.summary = status.summary.clone();
            }
            session.updated_at = Utc::now();
            true
        });
    }

    pub fn reset(&self) {
        self.state.send_replace(TrackerState::default());
    }

    fn apply(&self, event: &AgentEvent) {
        self.state.send_if_modified(|state| {
            if let Some(session) = &state.session {
                if session.session_id != event.session_id() {
                    debug!(
                        "Ignoring {} for untracked session {}",
                        event.event_type(),
                        event.session_id()
                    );
                    return false;
                }
            }

            match event {
                AgentEvent::Started(started) => {
                    let session = state.session.get_or_insert_with(|| {
                        AgentSession::new(
                            &started.session_id,
                            &started.bot_id,
                            &started.meeting_url,
                        )
                    });
                    session.updated_at = Utc::now();
                    state.status = MeetStatus::Joining;
                    true
                }
                AgentEvent::GoalCompleted(completed) => {
                    // Without a tracked session only the status moves.
                    if let Some(session) = state.session.as_mut() {
                        session.outcome = Some(completed.outcome.clone());
                        session.summary = Some(completed.summary.clone());
                        session.updated_at = Utc::now();
                    }
                    state.status = MeetStatus::Completed;
                    true
                }
            }
        });
    }
}

impl Default for AgentSessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for AgentSessionTracker {
    async fn handle(&self, event: &DomainEvent) {
        if let DomainEvent::Agent(event) = event {
            self.apply(event);
        }
    }
}
