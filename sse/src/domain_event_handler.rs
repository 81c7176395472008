use crate::error::Error;
use crate::message::{MessageHandler, StreamMessage};
use async_trait::async_trait;
use events::EventPublisher;
use log::*;

/// Bridges a stream subscription to domain event consumers.
///
/// Each JSON message is classified and published: recognized events go to
/// `EventHandler::handle`, other JSON objects to `EventHandler::handle_record`.
/// Text messages, arrays and primitives are logged and dropped.
pub struct DomainEventDispatcher {
    publisher: EventPublisher,
}

impl DomainEventDispatcher {
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl MessageHandler for DomainEventDispatcher {
    async fn on_message(&self, message: StreamMessage) {
        match message {
            StreamMessage::Json(value) => {
                if !self.publisher.publish_value(&value).await {
                    debug!("Ignoring JSON message that is not an object");
                }
            }
            StreamMessage::Text(text) => {
                debug!("Ignoring non-JSON message ({} bytes)", text.len());
            }
        }
    }

    async fn on_error(&self, error: &Error) {
        // Retries are unlimited; consumers keep showing "awaiting data".
        warn!("Event stream unavailable, will retry: {error}");
    }

    async fn on_open(&self) {
        info!(
            "Event stream connected, dispatching to {} handler(s)",
            self.publisher.handler_count()
        );
    }
}
