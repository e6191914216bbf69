//! In-memory implementation of the messaging crate.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Connections route published messages to matching subscriptions.
pub mod connection;

/// Subscriptions deliver routed messages to their handlers.
pub mod subscription;

pub use connection::{Error, MemoryConnection, MemoryConnectionOptions};
pub use subscription::MemorySubscription;
