use herald_messaging::{ConnectionError, SubjectError};
use thiserror::Error;

/// Errors that can occur on a NATS connection.
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting to the servers failed.
    #[error("failed to connect to NATS: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// Draining the client on close failed.
    #[error("failed to drain NATS connection: {0}")]
    Drain(String),

    /// A configured host is not a valid server address.
    #[error("invalid NATS host '{host}': {reason}")]
    InvalidHost {
        /// The offending host.
        host: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The subject is malformed.
    #[error("invalid subject: {0}")]
    InvalidSubject(#[from] SubjectError),

    /// Authentication is required but no NKey seed was configured.
    #[error("nkey seed is required when not running against a test server")]
    MissingNkey,

    /// No subject is configured under the given name.
    #[error("no subject configured for '{0}'")]
    MissingSubject(String),

    /// No hosts were configured.
    #[error("no NATS hosts configured")]
    NoHosts,

    /// The config document could not be parsed.
    #[error("failed to parse NATS config: {0}")]
    ParseConfig(#[from] serde_yaml::Error),

    /// The config file could not be read.
    #[error("failed to read NATS config {path}: {reason}")]
    ReadConfig {
        /// Path of the config file.
        path: String,
        /// Why it could not be read.
        reason: String,
    },

    /// Opening the subscription failed.
    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// The subscription's delivery task is gone.
    #[error("subscription on '{0}' is already closed")]
    SubscriptionClosed(String),

    /// The server rejected the unsubscribe.
    #[error("unsubscribe failed: {0}")]
    Unsubscribe(String),
}

impl ConnectionError for Error {}
