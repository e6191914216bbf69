use crate::handler::MessageHandler;

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

/// Marker trait for connection errors
pub trait ConnectionError: Error + Send + Sync + 'static {}

/// A single logical connection to a message bus.
///
/// Implementations own the delivery loop of every subscription they open: messages for one
/// subscription are handed to its handler one at a time, in the order the bus delivers them.
/// Connection lifecycle events (reconnects, disconnects, async errors) are logged by the
/// implementation and never returned from these methods.
#[async_trait]
pub trait Connection
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for the connection.
    type Error: ConnectionError;

    /// Opaque handle to an open subscription.
    type Subscription: Debug + Send + Sync + 'static;

    /// Opens a subscription on `subject`, delivering every message to `handler`.
    ///
    /// Malformed subjects are rejected here.
    async fn subscribe(
        &self,
        subject: String,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self::Subscription, Self::Error>;

    /// Closes a subscription previously returned by [`Connection::subscribe`].
    async fn unsubscribe(&self, subscription: Self::Subscription) -> Result<(), Self::Error>;
}
