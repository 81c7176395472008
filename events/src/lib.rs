//! Event system infrastructure for REVEL8.
//!
//! This crate owns the typed view of everything the backend pushes over its
//! event stream, and the plumbing that hands those events to consumers.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing every recognized business event
//! - **classify**: Layered predicates that narrow a decoded JSON value into a `DomainEvent`
//! - **osint**: The total coercion boundary for untrusted OSINT payloads
//! - **EventHandler**: Trait for implementing event consumers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on transport or application crates, so both
//! the stream client and the consumers can depend on it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod agent;
pub mod classify;
pub mod osint;

pub use agent::{AgentEvent, SessionStatus};
pub use classify::{classify, Classification};
pub use osint::IntelligenceReport;

/// Business events recognized on the event stream.
///
/// Only values that passed classification are represented here; the
/// discriminant of each variant decides which fields are available.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A (possibly partial) OSINT report, already coerced into a complete record.
    IntelligenceReport(IntelligenceReport),
    /// A voice agent lifecycle transition.
    Agent(AgentEvent),
}

impl DomainEvent {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::IntelligenceReport(_) => "intelligence_report",
            DomainEvent::Agent(event) => event.event_type(),
        }
    }
}

/// Trait for handling domain events.
/// Implementations keep whatever derived state they need, usually behind a lock.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);

    /// Called with well-formed JSON objects that are not recognized events.
    /// The default ignores them.
    async fn handle_record(&self, _record: &Map<String, Value>) {}
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher wherever messages are dispatched from.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers, one after another.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Publish an unrecognized record to all registered handlers.
    pub async fn publish_record(&self, record: Map<String, Value>) {
        for handler in self.handlers.iter() {
            handler.handle_record(&record).await;
        }
    }

    /// Classify a decoded message and publish it if it is an event or a record.
    /// Returns `false` when the value was ignored.
    pub async fn publish_value(&self, value: &Value) -> bool {
        match classify(value) {
            Classification::Event(event) => {
                self.publish(event).await;
                true
            }
            Classification::Record(record) => {
                self.publish_record(record).await;
                true
            }
            Classification::Ignored => false,
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
