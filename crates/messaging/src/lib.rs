//! Abstract interface for consuming subjects on a message bus.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Connections open and close subscriptions on a message bus.
pub mod connection;

/// Deadline context passed to handlers.
pub mod context;

/// Delivery of single messages to handlers.
pub mod delivery;

/// Handlers process messages for subscriptions.
pub mod handler;

/// Messages received from subjects.
pub mod message;

/// Subjects are named channels for messages.
pub mod subject;

pub use connection::{Connection, ConnectionError};
pub use context::HandlerContext;
pub use delivery::{DEFAULT_HANDLER_TIMEOUT, Delivery, deliver};
pub use handler::{HandlerError, HandlerFn, MessageHandler, handler_fn};
pub use message::{Headers, Message};
pub use subject::{SubjectError, subject_matches_pattern, validate_subject, validate_subject_pattern};
