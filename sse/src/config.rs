use std::time::Duration;

/// Base address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Header that makes ngrok skip its browser interstitial page.
pub const BYPASS_HEADER_NAME: &str = "ngrok-skip-browser-warning";
pub const BYPASS_HEADER_VALUE: &str = "true";

/// Fixed delay between a connection loss and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Client-wide settings, fixed when the [`crate::Manager`] is created.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Treat a body read that stalls for this long as a read error.
    /// `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            idle_timeout: None,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Absolute URLs are used as given, anything else is appended to the base address.
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Per-subscription options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubscribeOptions {
    pub reconnect_delay: Duration,
}

impl SubscribeOptions {
    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}
