use domain::gateway::agent_api::AgentApiClient;
use domain::{ActivityLog, AgentSessionTracker, IntelligenceStore};
use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger};
use sse::{ClientConfig, DomainEventDispatcher, Manager, SubscribeOptions};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!("Following REVEL8 event stream at [{}]...", config.api_url());

    let client_config = ClientConfig::new(config.api_url()).with_idle_timeout(config.idle_timeout());
    let manager = match Manager::new(client_config) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!("Failed to build stream client: {e}");
            std::process::exit(1);
        }
    };

    let tracker = Arc::new(AgentSessionTracker::new());
    let store = Arc::new(IntelligenceStore::new());
    let activity = Arc::new(ActivityLog::new());

    let publisher = EventPublisher::new()
        .with_handler(tracker.clone())
        .with_handler(store.clone())
        .with_handler(activity.clone());
    debug!("Registered {} event handlers", publisher.handler_count());

    let subscription = manager.open(
        config.stream_path(),
        Arc::new(DomainEventDispatcher::new(publisher)),
        SubscribeOptions::default().with_reconnect_delay(config.reconnect_delay()),
    );

    let mut session_updates = tracker.subscribe();
    tokio::spawn(async move {
        while session_updates.changed().await.is_ok() {
            let state = session_updates.borrow_and_update().clone();
            match (&state.session, &state.error) {
                (_, Some(error)) => warn!("Agent session {}: {error}", state.status.as_str()),
                (Some(session), None) => info!(
                    "Agent session {} is {}",
                    session.session_id,
                    state.status.as_str()
                ),
                (None, None) => info!("Agent session is {}", state.status.as_str()),
            }
            if let Some(summary) = state.session.as_ref().and_then(|s| s.summary.as_ref()) {
                info!("Agent summary: {summary}");
            }
        }
    });

    if let Some(meeting_url) = config.meeting_url() {
        let agent_api = AgentApiClient::new(manager.clone());
        tracker.begin_start();
        match agent_api.start_agent(meeting_url).await {
            Ok(started) => tracker.record_started(&started, meeting_url),
            Err(e) => {
                error!("Failed to start agent: {e}");
                tracker.record_failure(e.user_message());
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down...");
    if let Some(target) = config.target() {
        match store.get(target).await {
            Some(stored) => info!(
                "Intelligence on {}: {}% complete",
                stored.report.company_name(),
                stored.report.osint_completion_percentage
            ),
            None => info!("No intelligence received for {target}"),
        }
    }
    info!(
        "Received {} stream entries, intelligence on {} companies",
        activity.len().await,
        store.len().await
    );

    subscription.cancel();
    manager.shutdown();
    subscription.join().await;
}
