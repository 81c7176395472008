use crate::error::Error;
use crate::frame::LineDecoder;
use crate::message::{MessageHandler, StreamMessage};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use log::*;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const EVENT_STREAM: &str = "text/event-stream";

/// Unique identifier for a subscription (client-generated, used in logs)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a single connection attempt ended without an error.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// The server finished the body; treated as a connection loss.
    Closed,
    Cancelled,
}

/// The reconnecting read loop behind one subscription.
pub(crate) struct Connection {
    pub(crate) id: SubscriptionId,
    pub(crate) http: reqwest::Client,
    pub(crate) url: String,
    pub(crate) handler: Arc<dyn MessageHandler>,
    pub(crate) reconnect_delay: Duration,
    pub(crate) idle_timeout: Option<Duration>,
    pub(crate) token: CancellationToken,
}

impl Connection {
    /// Connects, streams and reconnects until the token is cancelled.
    pub(crate) async fn run(self) {
        while !self.token.is_cancelled() {
            match self.stream_once().await {
                Ok(Outcome::Cancelled) => break,
                Ok(Outcome::Closed) => {
                    info!(
                        "SSE connection {} closed, reconnecting in {:?}",
                        self.id, self.reconnect_delay
                    );
                }
                Err(e) => {
                    if self.token.is_cancelled() {
                        break;
                    }
                    error!("SSE connection {} error: {e}", self.id);
                    self.handler.on_error(&e).await;
                }
            }

            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {
                    debug!("Reconnecting SSE connection {} to {}", self.id, self.url);
                }
            }
        }

        debug!("SSE connection {} stopped", self.id);
    }

    async fn stream_once(&self) -> Result<Outcome, Error> {
        let request = self.http.get(&self.url).header(ACCEPT, EVENT_STREAM);

        let response = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Ok(Outcome::Cancelled),
            response = request.send() => response.map_err(Error::connect)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status.as_u16()));
        }
        if status == StatusCode::NO_CONTENT {
            return Err(Error::missing_body());
        }
        if self.token.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        info!("SSE connection {} opened to {}", self.id, self.url);
        self.handler.on_open().await;

        let mut body = pin!(response.bytes_stream());
        let mut decoder = LineDecoder::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Ok(Outcome::Cancelled),
                chunk = self.next_chunk(&mut body) => chunk?,
            };
            let Some(chunk) = chunk else {
                if decoder.pending() > 0 {
                    debug!(
                        "SSE connection {} dropped {} bytes of unterminated data",
                        self.id,
                        decoder.pending()
                    );
                }
                return Ok(Outcome::Closed);
            };

            for payload in decoder.decode(&chunk) {
                if self.token.is_cancelled() {
                    return Ok(Outcome::Cancelled);
                }
                let message = StreamMessage::from_payload(payload);
                trace!("SSE connection {} dispatching {} message", self.id, message.kind());
                self.handler.on_message(message).await;
            }
        }
    }

    async fn next_chunk<S>(&self, body: &mut S) -> Result<Option<Bytes>, Error>
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
    {
        let next = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, body.next())
                .await
                .map_err(|_| Error::idle_timeout(limit))?,
            None => body.next().await,
        };
        next.transpose().map_err(Error::read)
    }
}
