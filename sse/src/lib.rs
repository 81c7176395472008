//! Server-Sent Events (SSE) client for the REVEL8 event feed.
//!
//! This crate consumes the backend's `text/event-stream` endpoint and turns
//! it into an ordered sequence of [`StreamMessage`]s delivered to a
//! [`MessageHandler`].
//!
//! # Architecture
//!
//! - **One task per subscription**: `Manager::open` spawns a task that owns
//!   the connection, its byte buffer and its cancellation token. Nothing
//!   mutable is shared with the caller.
//! - **Line framing**: the body is split on `\n`; only `data: ` lines carry
//!   messages. Other SSE fields are intentionally not interpreted.
//! - **Lenient decoding**: payloads that parse as JSON arrive as
//!   `StreamMessage::Json`, everything else as `StreamMessage::Text`.
//! - **Unlimited fixed-delay reconnects**: connect errors, read errors and
//!   clean closes all schedule a new attempt after the reconnect delay.
//! - **Idempotent cancellation**: `Subscription::cancel` stops callbacks,
//!   pending reconnects and the in-flight request.
//!
//! # Example: Following the webhook stream
//!
//! ```rust,ignore
//! use sse::{ClientConfig, DomainEventDispatcher, Manager, SubscribeOptions};
//!
//! let manager = Manager::new(ClientConfig::new("http://localhost:8000"))?;
//! let subscription = manager.open(
//!     "/api/v1/webhook/stream",
//!     Arc::new(DomainEventDispatcher::new(publisher)),
//!     SubscribeOptions::default(),
//! );
//! // ...
//! subscription.cancel();
//! ```
//!
//! # Modules
//!
//! - `config`: Client-wide and per-subscription settings
//! - `connection`: The reconnecting read loop and `SubscriptionId`
//! - `domain_event_handler`: `MessageHandler` that publishes classified domain events
//! - `error`: Transport error tree
//! - `frame`: Chunk-independent `data: ` line framing
//! - `manager`: Subscription registry and request helper
//! - `message`: `StreamMessage` and the `MessageHandler` observer trait

pub mod config;
pub mod connection;
pub mod domain_event_handler;
pub mod error;
pub mod frame;
pub mod manager;
pub mod message;

pub use config::{ClientConfig, SubscribeOptions};
pub use connection::SubscriptionId;
pub use domain_event_handler::DomainEventDispatcher;
pub use error::Error;
pub use manager::{CancelHandle, Manager, Subscription};
pub use message::{MessageHandler, StreamMessage};
