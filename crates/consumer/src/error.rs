use crate::state::ManagerState;

use std::error::Error as StdError;

use thiserror::Error;

/// Errors reported by the consumer manager.
///
/// `Open` and `Cancelled` are delivered on the [`ErrorSink`](crate::ErrorSink) passed to
/// `start`; `InvalidState` is returned directly from the offending call.
#[derive(Debug, Error)]
pub enum Error {
    /// The subscription could not be opened. The binding never becomes active.
    #[error("failed to start consuming subject {subject}: {source}")]
    Open {
        /// Subject of the binding.
        subject: String,
        /// Error returned by the connection.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The start context was cancelled before the subscription opened.
    #[error("opening subject {subject} was cancelled")]
    Cancelled {
        /// Subject of the binding.
        subject: String,
    },

    /// The operation is not allowed in the manager's current state.
    #[error("cannot {operation} while the consumer manager is {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// State the manager was in.
        state: ManagerState,
    },
}

impl Error {
    /// Subject the error concerns, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Open { subject, .. } | Self::Cancelled { subject } => Some(subject),
            Self::InvalidState { .. } => None,
        }
    }
}
