//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the domain layer are modeled as a tree with `domain::error::Error`
/// at the root holding an `error_kind` that says where the failure came from.
/// The `source` field keeps the original lower-layer error. Callers branch on
/// the kind and never need to depend on `reqwest` or `sse` directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Enum representing failures of the backend API or the network between us.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The backend answered with a non-success status; `detail` is its explanation.
    Rejected { status: u16, detail: String },
    /// The backend answered successfully with a body we could not decode.
    InvalidResponse,
}

impl Error {
    pub(crate) fn rejected(status: u16, detail: String) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Rejected { status, detail }),
        }
    }

    pub(crate) fn invalid_response(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::InvalidResponse),
        }
    }

    /// Message suitable for showing to the operator.
    pub fn user_message(&self) -> String {
        match &self.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Rejected { detail, .. }) => detail.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Rejected { status, detail }) => {
                write!(f, "Backend rejected request ({status}): {detail}")
            }
            kind => match &self.source {
                Some(source) => write!(f, "Domain Error: {kind:?}: {source}"),
                None => write!(f, "Domain Error: {kind:?}"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the request. This type of
        // error occurs before any network call is made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build backend request".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

// Translate stream client errors into the domain layer.
impl From<sse::Error> for Error {
    fn from(err: sse::Error) -> Self {
        let error_kind = match &err.error_kind {
            sse::error::ErrorKind::Config => DomainErrorKind::Internal(InternalErrorKind::Config),
            sse::error::ErrorKind::Connect(_) | sse::error::ErrorKind::Read(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
