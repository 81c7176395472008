use crate::config::{ClientConfig, SubscribeOptions, BYPASS_HEADER_NAME, BYPASS_HEADER_VALUE};
use crate::connection::{Connection, SubscriptionId};
use crate::error::Error;
use crate::message::MessageHandler;
use dashmap::DashMap;
use log::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Opens and tracks stream subscriptions against one backend.
///
/// All subscriptions share a pooled HTTP client carrying the default headers,
/// but nothing else: each has its own buffer, task and cancellation.
pub struct Manager {
    http: reqwest::Client,
    config: ClientConfig,
    subscriptions: Arc<DashMap<SubscriptionId, CancellationToken>>,
}

impl Manager {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(BYPASS_HEADER_NAME),
            HeaderValue::from_static(BYPASS_HEADER_VALUE),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::config)?;

        Ok(Self {
            http,
            config,
            subscriptions: Arc::new(DashMap::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request builder for a plain API call, with the default headers applied.
    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.http.request(method, self.config.resolve(endpoint))
    }

    /// Starts streaming `endpoint` into `handler` on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        &self,
        endpoint: &str,
        handler: Arc<dyn MessageHandler>,
        options: SubscribeOptions,
    ) -> Subscription {
        let id = SubscriptionId::new();
        let token = CancellationToken::new();
        let url = self.config.resolve(endpoint);

        self.subscriptions.insert(id.clone(), token.clone());
        info!("Opening SSE subscription {id} to {url}");

        let connection = Connection {
            id: id.clone(),
            http: self.http.clone(),
            url,
            handler,
            reconnect_delay: options.reconnect_delay,
            idle_timeout: self.config.idle_timeout,
            token: token.clone(),
        };

        let registry = Arc::clone(&self.subscriptions);
        let task_id = id.clone();
        let task = tokio::spawn(async move {
            connection.run().await;
            registry.remove(&task_id);
        });

        Subscription { id, token, task }
    }

    /// Number of subscriptions whose task is still running.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Cancels every open subscription.
    pub fn shutdown(&self) {
        info!("Cancelling {} SSE subscription(s)", self.subscriptions.len());
        for entry in self.subscriptions.iter() {
            entry.value().cancel();
        }
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle does not stop the subscription; call [`Subscription::cancel`].
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Stops the subscription: no handler method is invoked once this returns,
    /// no reconnect is scheduled, and the in-flight request is dropped.
    /// Calling it again has no effect.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!("Cancelling SSE subscription {}", self.id);
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A cloneable handle that can cancel this subscription from elsewhere,
    /// including from inside its own handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.token.clone())
    }

    /// Waits for the subscription task to finish. Only returns after a cancel.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("SSE subscription {} task failed: {e}", self.id);
        }
    }
}

#[derive(Clone, Debug)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}
