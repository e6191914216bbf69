use herald_messaging::{ConnectionError, SubjectError};
use thiserror::Error;

/// Errors that can occur on an in-memory connection.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The connection was closed.
    #[error("connection closed")]
    Closed,

    /// The subject is malformed.
    #[error("invalid subject: {0}")]
    InvalidSubject(#[from] SubjectError),

    /// The subscription was already closed.
    #[error("subscription {id} on subject '{subject}' is not active")]
    NotSubscribed {
        /// Identifier of the subscription.
        id: u64,
        /// Subject the subscription was opened on.
        subject: String,
    },
}

impl ConnectionError for Error {}
