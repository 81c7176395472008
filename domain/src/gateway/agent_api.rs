//! Client for the backend's voice agent endpoints.
//!
//! The agent is a meeting bot that joins a Google Meet call and runs the
//! voice conversation. Starting it returns immediately; progress is then
//! reported as `agent_started` / `goal_completed` events on the webhook stream.

use crate::error::Error;
use events::SessionStatus;
use log::*;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sse::Manager;
use std::sync::Arc;

const START_PATH: &str = "/api/v1/agent/start";
const GOAL_COMPLETED_PATH: &str = "/api/v1/agent/goal-completed";
const STATUS_PATH: &str = "/api/v1/agent/status";

/// Request to start a new agent session
#[derive(Debug, Serialize)]
pub struct StartAgentRequest {
    pub meeting_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartAgentResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub bot_id: String,
}

/// Sent when the agent reports that it reached its goal
#[derive(Debug, Serialize)]
pub struct GoalCompletedRequest {
    pub session_id: String,
    pub outcome: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalCompletedResponse {
    pub acknowledged: bool,
}

/// Full state of a session as the backend sees it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub duration_seconds: i64,
    pub bot_id: String,
    pub created_at: String,
    pub meeting_url: Option<String>,
    pub outcome: Option<String>,
    pub summary: Option<String>,
}

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub struct AgentApiClient {
    manager: Arc<Manager>,
}

impl AgentApiClient {
    /// Uses the stream manager's base address and default headers.
    pub fn new(manager: Arc<Manager>) -> Self {
        Self { manager }
    }

    /// Ask the backend to send the agent into `meeting_url`.
    pub async fn start_agent(&self, meeting_url: &str) -> Result<StartAgentResponse, Error> {
        let meeting_url = meeting_url.trim();
        debug!("Starting agent for meeting: {meeting_url}");

        let request = StartAgentRequest {
            meeting_url: meeting_url.to_string(),
        };
        let response = self
            .manager
            .request(Method::POST, START_PATH)
            .json(&request)
            .send()
            .await?;

        let started: StartAgentResponse =
            Self::parse(response, "Failed to start agent").await?;
        info!(
            "Agent session {} started with bot {}",
            started.session_id, started.bot_id
        );
        Ok(started)
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatusResponse, Error> {
        let path = format!("{STATUS_PATH}/{session_id}");
        let response = self.manager.request(Method::GET, &path).send().await?;
        Self::parse(response, "Failed to get session status").await
    }

    /// Report that the agent reached its goal; the backend removes the bot from the call.
    pub async fn goal_completed(
        &self,
        request: &GoalCompletedRequest,
    ) -> Result<GoalCompletedResponse, Error> {
        let response = self
            .manager
            .request(Method::POST, GOAL_COMPLETED_PATH)
            .json(request)
            .send()
            .await?;
        Self::parse(response, "Failed to complete goal").await
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        failure: &str,
    ) -> Result<T, Error> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                warn!("Failed to parse agent API response: {e:?}");
                Error::invalid_response(e)
            });
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| format!("{failure}: {}", status.as_u16()));
        warn!("Agent API error: {detail}");
        Err(Error::rejected(status.as_u16(), detail))
    }
}
