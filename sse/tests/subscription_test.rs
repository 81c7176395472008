use async_trait::async_trait;
use events::agent::AgentEvent;
use events::classify::{is_agent_event, is_agent_started_event};
use mockito::{Server, ServerGuard};
use serde_json::json;
use sse::{ClientConfig, Error, Manager, MessageHandler, StreamMessage, SubscribeOptions};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const STREAM_PATH: &str = "/api/v1/webhook/stream";

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Open,
    Message(StreamMessage),
    Error(String),
}

struct Recorder {
    tx: UnboundedSender<Seen>,
}

#[async_trait]
impl MessageHandler for Recorder {
    async fn on_message(&self, message: StreamMessage) {
        let _ = self.tx.send(Seen::Message(message));
    }

    async fn on_error(&self, error: &Error) {
        let _ = self.tx.send(Seen::Error(error.to_string()));
    }

    async fn on_open(&self) {
        let _ = self.tx.send(Seen::Open);
    }
}

fn recorder() -> (Arc<Recorder>, UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(Recorder { tx }), rx)
}

async fn next(rx: &mut UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a callback")
        .expect("handler dropped")
}

fn manager_for(server: &ServerGuard) -> Manager {
    Manager::new(ClientConfig::new(server.url())).unwrap()
}

fn slow_reconnect() -> SubscribeOptions {
    SubscribeOptions::default().with_reconnect_delay(Duration::from_secs(60))
}

#[tokio::test]
async fn test_dispatches_data_lines_in_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", STREAM_PATH)
        .match_header("accept", "text/event-stream")
        .match_header("ngrok-skip-browser-warning", "true")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            "data: {\"companyProfile\":{\"name\":\"Acme\"}}\n\n",
            "event: osint\n",
            ": keep-alive\n",
            "data: hello there\n",
            "data: [1,2]\n",
        ))
        .expect(1)
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    assert_eq!(next(&mut rx).await, Seen::Open);
    assert_eq!(
        next(&mut rx).await,
        Seen::Message(StreamMessage::Json(
            json!({ "companyProfile": { "name": "Acme" } })
        ))
    );
    assert_eq!(
        next(&mut rx).await,
        Seen::Message(StreamMessage::Text("hello there".to_string()))
    );
    assert_eq!(
        next(&mut rx).await,
        Seen::Message(StreamMessage::Json(json!([1, 2])))
    );

    subscription.cancel();
    subscription.join().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_agent_event_split_across_chunks_is_reassembled() {
    let line = concat!(
        "data: {\"event_type\":\"agent_started\",\"session_id\":\"s1\",\"bot_id\":\"b1\",",
        "\"status\":\"joining\",\"timestamp\":\"T\",\"meeting_url\":\"https://x\"}\n"
    );
    let split = line.find("\"age").unwrap() + "\"age".len();
    let (first, second) = (line[..split].to_string(), line[split..].to_string());

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(move |w| {
            w.write_all(first.as_bytes())?;
            w.flush()?;
            w.write_all(second.as_bytes())?;
            w.flush()
        })
        .expect(1)
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    assert_eq!(next(&mut rx).await, Seen::Open);
    let value = match next(&mut rx).await {
        Seen::Message(StreamMessage::Json(value)) => value,
        other => panic!("expected a JSON message, got {other:?}"),
    };
    assert!(is_agent_event(&value));
    let event = AgentEvent::from_value(&value).expect("complete agent_started event");
    assert!(is_agent_started_event(&event));

    // Nothing else arrives: no error and no reconnect within the long delay.
    assert!(
        tokio::time::timeout(Duration::from_millis(300), rx.recv())
            .await
            .is_err()
    );

    subscription.cancel();
    subscription.join().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_clean_close_reconnects_once_after_delay() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("")
        .expect(2)
        .create_async()
        .await;

    let delay = Duration::from_millis(400);
    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(
        STREAM_PATH,
        handler,
        SubscribeOptions::default().with_reconnect_delay(delay),
    );

    assert_eq!(next(&mut rx).await, Seen::Open);
    let closed_at = Instant::now();
    assert_eq!(next(&mut rx).await, Seen::Open);
    assert!(closed_at.elapsed() >= delay);

    // The next attempt is a full delay away; nothing may arrive before it.
    assert!(
        tokio::time::timeout(delay / 2, rx.recv()).await.is_err(),
        "reconnected more than once per close"
    );

    subscription.cancel();
    subscription.join().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_reported_and_retried() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(500)
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(
        STREAM_PATH,
        handler,
        SubscribeOptions::default().with_reconnect_delay(Duration::from_millis(50)),
    );

    assert_eq!(
        next(&mut rx).await,
        Seen::Error("SSE connection failed: 500".to_string())
    );
    assert_eq!(
        next(&mut rx).await,
        Seen::Error("SSE connection failed: 500".to_string())
    );

    subscription.cancel();
    subscription.join().await;
}

#[tokio::test]
async fn test_no_content_is_a_missing_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(204)
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    assert_eq!(
        next(&mut rx).await,
        Seen::Error("SSE response has no body".to_string())
    );

    subscription.cancel();
    subscription.join().await;
}

#[tokio::test]
async fn test_unreachable_server_reports_connect_error() {
    let manager = Manager::new(ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    match next(&mut rx).await {
        Seen::Error(message) => assert!(message.starts_with("SSE request failed")),
        other => panic!("expected a connect error, got {other:?}"),
    }

    subscription.cancel();
    subscription.join().await;
}

#[tokio::test]
async fn test_cancel_twice_before_connecting_is_silent() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_body("data: {}\n")
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    subscription.cancel();
    subscription.cancel();
    assert!(subscription.is_cancelled());
    subscription.join().await;

    assert!(rx.try_recv().is_err());
    assert_eq!(manager.active_subscriptions(), 0);
}

struct CancelAfterFirst {
    seen: Mutex<Vec<StreamMessage>>,
    cancel: Mutex<Option<sse::CancelHandle>>,
    done: UnboundedSender<()>,
}

#[async_trait]
impl MessageHandler for CancelAfterFirst {
    async fn on_message(&self, message: StreamMessage) {
        self.seen.lock().unwrap().push(message);
        if let Some(handle) = self.cancel.lock().unwrap().as_ref() {
            handle.cancel();
            handle.cancel();
        }
        let _ = self.done.send(());
    }
}

#[tokio::test]
async fn test_cancel_from_handler_stops_remaining_messages() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_body("data: 1\ndata: 2\ndata: 3\n")
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let handler = Arc::new(CancelAfterFirst {
        seen: Mutex::new(Vec::new()),
        cancel: Mutex::new(None),
        done: done_tx,
    });
    let subscription = manager.open(STREAM_PATH, handler.clone(), slow_reconnect());
    *handler.cancel.lock().unwrap() = Some(subscription.cancel_handle());

    tokio::time::timeout(Duration::from_secs(5), done_rx.recv())
        .await
        .expect("no message dispatched");
    subscription.join().await;

    assert_eq!(
        *handler.seen.lock().unwrap(),
        vec![StreamMessage::Json(json!(1))]
    );
}

#[tokio::test]
async fn test_idle_timeout_reports_read_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            w.write_all(b"data: 1\n")?;
            w.flush()?;
            std::thread::sleep(Duration::from_millis(1500));
            w.write_all(b"data: 2\n")
        })
        .create_async()
        .await;

    let config = ClientConfig::new(server.url()).with_idle_timeout(Some(Duration::from_millis(200)));
    let manager = Manager::new(config).unwrap();
    let (handler, mut rx) = recorder();
    let subscription = manager.open(STREAM_PATH, handler, slow_reconnect());

    assert_eq!(next(&mut rx).await, Seen::Open);
    assert_eq!(
        next(&mut rx).await,
        Seen::Message(StreamMessage::Json(json!(1)))
    );
    match next(&mut rx).await {
        Seen::Error(message) => assert!(message.starts_with("SSE stream went idle")),
        other => panic!("expected an idle timeout, got {other:?}"),
    }

    subscription.cancel();
    subscription.join().await;
}

#[tokio::test]
async fn test_shutdown_cancels_every_subscription() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", STREAM_PATH)
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let manager = manager_for(&server);
    let (first_handler, mut first_rx) = recorder();
    let (second_handler, mut second_rx) = recorder();
    let first = manager.open(STREAM_PATH, first_handler, slow_reconnect());
    let second = manager.open(STREAM_PATH, second_handler, slow_reconnect());

    assert_eq!(next(&mut first_rx).await, Seen::Open);
    assert_eq!(next(&mut second_rx).await, Seen::Open);
    assert_eq!(manager.active_subscriptions(), 2);

    manager.shutdown();
    first.join().await;
    second.join().await;

    assert!(first_rx.try_recv().is_err());
    assert!(second_rx.try_recv().is_err());
    assert_eq!(manager.active_subscriptions(), 0);
}

#[tokio::test]
async fn test_request_helper_sends_bypass_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/webhook/status")
        .match_header("ngrok-skip-browser-warning", "true")
        .with_status(200)
        .with_body("{\"status\":\"active\"}")
        .create_async()
        .await;

    let manager = manager_for(&server);
    let response = manager
        .request(reqwest::Method::GET, "/api/v1/webhook/status")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    mock.assert_async().await;
}
