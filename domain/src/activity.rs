//! Bounded history of everything received on the event stream.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use events::{DomainEvent, EventHandler};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Entries kept before the oldest is dropped.
pub const DEFAULT_CAPACITY: usize = 100;

/// Kind recorded for objects that are not recognized events.
pub const RECORD_KIND: &str = "record";

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub received_at: DateTime<Utc>,
    pub kind: String,
    pub payload: Value,
}

pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub async fn push(&self, kind: &str, payload: Value) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(ActivityEntry {
            received_at: Utc::now(),
            kind: kind.to_string(),
            payload,
        });
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Up to `count` of the newest entries, oldest first.
    pub async fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().await;
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for ActivityLog {
    async fn handle(&self, event: &DomainEvent) {
        let payload = match event {
            DomainEvent::IntelligenceReport(report) => serde_json::to_value(report),
            DomainEvent::Agent(event) => serde_json::to_value(event),
        }
        .unwrap_or_default();
        self.push(event.kind(), payload).await;
    }

    async fn handle_record(&self, record: &Map<String, Value>) {
        self.push(RECORD_KIND, Value::Object(record.clone())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::agent::{AgentEvent, AgentStarted};
    use events::SessionStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_oldest_entries_are_dropped() {
        let log = ActivityLog::with_capacity(3);
        for i in 0..5 {
            log.push(RECORD_KIND, json!({ "n": i })).await;
        }

        let payloads: Vec<Value> = log.entries().await.into_iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec![json!({"n": 2}), json!({"n": 3}), json!({"n": 4})]);
    }

    #[tokio::test]
    async fn test_default_capacity() {
        let log = ActivityLog::new();
        for i in 0..(DEFAULT_CAPACITY + 20) {
            log.push(RECORD_KIND, json!(i)).await;
        }
        assert_eq!(log.len().await, DEFAULT_CAPACITY);
        assert_eq!(log.entries().await[0].payload, json!(20));
    }

    #[tokio::test]
    async fn test_recent_returns_newest_last() {
        let log = ActivityLog::new();
        for i in 0..5 {
            log.push(RECORD_KIND, json!(i)).await;
        }
        let recent: Vec<Value> = log.recent(2).await.into_iter().map(|e| e.payload).collect();
        assert_eq!(recent, vec![json!(3), json!(4)]);
        assert_eq!(log.recent(10).await.len(), 5);
    }

    #[tokio::test]
    async fn test_records_and_events_are_logged() {
        let log = ActivityLog::new();
        let record = json!({ "hello": "world" });
        log.handle_record(record.as_object().unwrap()).await;

        let event = DomainEvent::Agent(AgentEvent::Started(AgentStarted {
            session_id: "s1".to_string(),
            bot_id: "b1".to_string(),
            status: SessionStatus::Joining,
            timestamp: "2026-10-19T10:00:00".to_string(),
            meeting_url: "https://meet.google.com/abc".to_string(),
        }));
        log.handle(&event).await;

        let entries = log.entries().await;
        assert_eq!(entries[0].kind, RECORD_KIND);
        assert_eq!(entries[0].payload, record);
        assert_eq!(entries[1].kind, "agent_started");
        assert_eq!(entries[1].payload["event_type"], "agent_started");
        assert_eq!(entries[1].payload["session_id"], "s1");

        log.clear().await;
        assert!(log.is_empty().await);
    }
}
