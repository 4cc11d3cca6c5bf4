//! Failure taxonomy.
//!
//! Repositories and use cases report a rich [`UseCaseError`]. Before anything
//! reaches a [`ResultChannel`](crate::ResultChannel) it is folded into one of
//! the two [`Failure`] kinds the UI layer knows how to present.

use std::io;

use thiserror::Error;

/// What the UI layer gets to see about a failed invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Failure {
    /// No connectivity, or the request failed at the network level.
    #[error("connection failure")]
    ConnectionFailure,
    /// Parsing, server errors, programming errors: anything else.
    #[error("unexpected failure")]
    UnexpectedFailure,
}

impl Failure {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailure)
    }
}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("network unreachable: {0}")]
    Unreachable(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn failure(&self) -> Failure {
        match self {
            Self::Unreachable(_) | Self::Request(_) | Self::Timeout => Failure::ConnectionFailure,
            Self::Io(e) if is_connection_kind(e.kind()) => Failure::ConnectionFailure,
            Self::Io(_)
            | Self::Status(_)
            | Self::Decode(_)
            | Self::NotFound { .. }
            | Self::Other(_) => Failure::UnexpectedFailure,
        }
    }
}

impl From<&UseCaseError> for Failure {
    fn from(e: &UseCaseError) -> Self {
        e.failure()
    }
}

impl From<UseCaseError> for Failure {
    fn from(e: UseCaseError) -> Self {
        e.failure()
    }
}

fn is_connection_kind(kind: io::ErrorKind) -> bool {
    use io::ErrorKind::*;
    matches!(
        kind,
        ConnectionRefused
            | ConnectionReset
            | ConnectionAborted
            | NotConnected
            | AddrNotAvailable
            | BrokenPipe
            | TimedOut
            | HostUnreachable
            | NetworkUnreachable
            | NetworkDown
    )
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("worker_threads must be at least 1")]
    NoWorkers,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to start the worker runtime: {0}")]
    Spawn(#[source] io::Error),
}
