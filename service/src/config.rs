use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

/// Base URL of the backend API used when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Path of the backend's webhook event stream.
pub const DEFAULT_STREAM_PATH: &str = "/api/v1/webhook/stream";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the REVEL8 backend API. Relative endpoint paths are resolved against it.
    #[arg(long, env, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Path (or absolute URL) of the server-sent event stream to follow.
    #[arg(long, env, default_value = DEFAULT_STREAM_PATH)]
    stream_path: String,

    /// Fixed delay in milliseconds between a lost stream connection and the next attempt.
    #[arg(long, env, default_value_t = 3000)]
    pub reconnect_delay_ms: u64,

    /// Treat the stream as lost when no data arrives for this many seconds.
    /// Unset means wait indefinitely.
    #[arg(long, env)]
    pub idle_timeout_secs: Option<u64>,

    /// Google Meet URL to send the voice agent into on startup.
    #[arg(long, env)]
    meeting_url: Option<String>,

    /// Company whose OSINT report progress is reported.
    #[arg(long, env)]
    target: Option<String>,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Builds a configuration from explicit arguments, still honoring the environment.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::try_parse_from(args)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn stream_path(&self) -> &str {
        &self.stream_path
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn meeting_url(&self) -> Option<&str> {
        self.meeting_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 7] = [
        "API_URL",
        "STREAM_PATH",
        "RECONNECT_DELAY_MS",
        "IDLE_TIMEOUT_SECS",
        "MEETING_URL",
        "TARGET",
        "LOG_LEVEL_FILTER",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_args(["revel8"]).unwrap();

        assert_eq!(config.api_url(), "http://localhost:8000");
        assert_eq!(config.stream_path(), "/api/v1/webhook/stream");
        assert_eq!(config.reconnect_delay(), Duration::from_millis(3000));
        assert_eq!(config.idle_timeout(), None);
        assert_eq!(config.meeting_url(), None);
        assert_eq!(config.target(), None);
        assert_eq!(config.log_level_filter, LevelFilter::Info);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        clear_env();
        env::set_var("API_URL", "https://abc.ngrok.app");
        env::set_var("IDLE_TIMEOUT_SECS", "45");
        let config = Config::from_args(["revel8"]).unwrap();
        clear_env();

        assert_eq!(config.api_url(), "https://abc.ngrok.app");
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(45)));
    }

    #[test]
    #[serial]
    fn test_flags_and_blank_meeting_url() {
        clear_env();
        let config = Config::from_args([
            "revel8",
            "--reconnect-delay-ms",
            "250",
            "--meeting-url",
            "   ",
            "--target",
            "Acme",
            "--log-level-filter",
            "DEBUG",
        ])
        .unwrap();

        assert_eq!(config.reconnect_delay(), Duration::from_millis(250));
        assert_eq!(config.meeting_url(), None);
        assert_eq!(config.target(), Some("Acme"));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn test_rejects_unknown_log_level() {
        clear_env();
        assert!(Config::from_args(["revel8", "--log-level-filter", "LOUD"]).is_err());
    }
}
