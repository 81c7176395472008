//! Consumers of the REVEL8 event stream and clients for the backend API.
//!
//! Each consumer is an `events::EventHandler` registered on the publisher that
//! the stream dispatcher feeds.

pub mod activity;
pub mod agent_session;
pub mod error;
pub mod gateway;
pub mod intelligence;

pub use activity::ActivityLog;
pub use agent_session::{AgentSessionTracker, MeetStatus};
pub use error::Error;
pub use intelligence::IntelligenceStore;
