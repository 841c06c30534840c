//! Error types for the vrijeme poller.

use quick_xml::errors::serialize::DeError;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a failed refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network error, timeout, or a non-200 response.
    Transport,
    /// Body is not XML or lacks the expected structure.
    MalformedDocument,
    /// The configured city has no record in the current payload.
    UnknownCity,
}

/// A refresh cycle that did not produce a snapshot.
///
/// Cloneable so that callers coalesced onto an in-flight refresh receive
/// the same failure as the caller that performed the fetch.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// Connection, DNS, TLS or body-read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with something other than 200
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Upstream did not answer within the fetch timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// XML parse failure or missing structure
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// No `Grad` record carries the configured name
    #[error("City {0} not found in data")]
    CityNotFound(String),
}

impl RefreshError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RefreshError::Transport(_) | RefreshError::Status(_) | RefreshError::Timeout(_) => {
                FailureKind::Transport
            }
            RefreshError::Malformed(_) => FailureKind::MalformedDocument,
            RefreshError::CityNotFound(_) => FailureKind::UnknownCity,
        }
    }
}

impl From<DeError> for RefreshError {
    fn from(err: DeError) -> Self {
        RefreshError::Malformed(err.to_string())
    }
}

/// Errors from loading or validating the YAML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Errors surfaced to the host process.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The first refresh failed; there is no snapshot to serve.
    #[error("Initial update failed: {0}")]
    NotReady(#[source] RefreshError),

    /// A one-off refresh requested from the CLI failed
    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Init error: {0}")]
    Init(String),
}
