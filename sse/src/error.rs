//! Error types for the `sse` client.
//!
//! Follows the same pattern as the other crates in the workspace: a root
//! `Error` struct holding an error kind tree and an optional source.
//! Only transport failures are errors; payloads that are not JSON or do not
//! match a known event are normal branches, never errors.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of client errors.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The client could not be constructed from its configuration.
    Config,
    /// Failures before the body starts streaming.
    Connect(ConnectErrorKind),
    /// Failures while reading the body.
    Read(ReadErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum ConnectErrorKind {
    /// The server answered with a non-success status code.
    Status(u16),
    /// The server answered successfully but without a body (204 No Content).
    MissingBody,
    /// The request could not be sent.
    Request,
}

#[derive(Debug, PartialEq)]
pub enum ReadErrorKind {
    Network,
    IdleTimeout,
}

impl Error {
    pub(crate) fn config(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Error {
            source: Some(err.into()),
            error_kind: ErrorKind::Config,
        }
    }

    pub(crate) fn connect(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Connect(ConnectErrorKind::Request),
        }
    }

    pub(crate) fn status(status: u16) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Connect(ConnectErrorKind::Status(status)),
        }
    }

    pub(crate) fn missing_body() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Connect(ConnectErrorKind::MissingBody),
        }
    }

    pub(crate) fn read(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Read(ReadErrorKind::Network),
        }
    }

    pub(crate) fn idle_timeout(limit: Duration) -> Self {
        Error {
            source: Some(format!("no data received for {limit:?}").into()),
            error_kind: ErrorKind::Read(ReadErrorKind::IdleTimeout),
        }
    }

    /// True for errors raised before any byte of the body was read.
    pub fn is_connect(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Connect(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config => write!(f, "SSE client configuration error")?,
            ErrorKind::Connect(ConnectErrorKind::Status(status)) => {
                write!(f, "SSE connection failed: {status}")?
            }
            ErrorKind::Connect(ConnectErrorKind::MissingBody) => {
                write!(f, "SSE response has no body")?
            }
            ErrorKind::Connect(ConnectErrorKind::Request) => write!(f, "SSE request failed")?,
            ErrorKind::Read(ReadErrorKind::Network) => write!(f, "SSE stream read failed")?,
            ErrorKind::Read(ReadErrorKind::IdleTimeout) => write!(f, "SSE stream went idle")?,
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = Error::status(503);
        assert_eq!(err.to_string(), "SSE connection failed: 503");
        assert!(err.is_connect());
    }

    #[test]
    fn test_idle_timeout_is_read_error() {
        let err = Error::idle_timeout(Duration::from_secs(30));
        assert_eq!(err.error_kind, ErrorKind::Read(ReadErrorKind::IdleTimeout));
        assert!(!err.is_connect());
        assert!(err.to_string().starts_with("SSE stream went idle"));
    }
}
