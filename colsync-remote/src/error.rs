//! Failure taxonomy for remote collection calls.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// How a remote call failed.
///
/// Only [`RemoteErrorKind::NotFound`] is recoverable by the sync engine;
/// every other kind is terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The identifier no longer denotes a resource.
    NotFound,
    /// The service answered with a failure status (auth, validation, quota).
    Rejected { status: u16 },
    /// No usable answer: connection, TLS or timeout failure.
    Transport,
    /// The service answered with success but the body was not understood.
    UnexpectedResponse,
    /// The uid cannot be addressed as a collection; nothing was sent.
    InvalidIdentifier,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::NotFound => write!(f, "not found"),
            RemoteErrorKind::Rejected { status } => write!(f, "rejected ({status})"),
            RemoteErrorKind::Transport => write!(f, "transport failure"),
            RemoteErrorKind::UnexpectedResponse => write!(f, "unexpected response"),
            RemoteErrorKind::InvalidIdentifier => write!(f, "invalid identifier"),
        }
    }
}

/// A failed remote call, with the service's error payload preserved.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    #[serde(flatten)]
    pub kind: RemoteErrorKind,
    pub message: String,
    /// The `error` object returned by the service, or `null`.
    pub payload: Value,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>, payload: Value) -> Self {
        Self {
            kind,
            message: message.into(),
            payload,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message, Value::Null)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }
}
