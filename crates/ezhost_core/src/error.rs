use std::fmt;

use thiserror::Error;

use crate::reconcile::CONFIRMATION_TOKEN;

/// Every failure a remote, local or persistence operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EzHostError {
    /// Transport-level failure: network, timeout, non-success status, rate limit.
    #[error("request failed ({kind}): {message}")]
    RemoteRequest {
        kind: RequestFailure,
        message: String,
    },
    /// Well-formed error answer from the hosting service.
    #[error("api error: {0}")]
    RemoteApi(String),
    /// The history file exists but cannot be understood.
    #[error("history is corrupt: {0}")]
    CorruptState(String),
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),
    #[error("purge not confirmed; type '{}' to proceed", CONFIRMATION_TOKEN)]
    NotConfirmed,
    /// Disk read or write failure on the history file.
    #[error("history persistence failed: {0}")]
    Persistence(String),
}

impl EzHostError {
    pub fn request(kind: RequestFailure, message: impl Into<String>) -> Self {
        Self::RemoteRequest {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RemoteRequest {
                kind: RequestFailure::RateLimited,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFailure {
    RateLimited,
    Timeout,
    HttpStatus(u16),
    InvalidUrl,
    Network,
    /// Local IO while preparing a request (e.g. reading an upload).
    Io,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::RateLimited => write!(f, "rate limited"),
            RequestFailure::Timeout => write!(f, "timeout"),
            RequestFailure::HttpStatus(code) => write!(f, "http status {code}"),
            RequestFailure::InvalidUrl => write!(f, "invalid url"),
            RequestFailure::Network => write!(f, "network error"),
            RequestFailure::Io => write!(f, "io error"),
        }
    }
}
