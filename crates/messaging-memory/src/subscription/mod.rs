use std::sync::Arc;
use std::time::Duration;

use herald_messaging::{Message, MessageHandler, deliver};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a subscription opened on a [`MemoryConnection`](crate::MemoryConnection).
#[derive(Debug)]
pub struct MemorySubscription {
    pub(crate) id: u64,
    pub(crate) subject: String,
    pub(crate) stop: CancellationToken,
}

impl MemorySubscription {
    /// The subject (or pattern) the subscription was opened on.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Identifier unique within the owning connection.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Delivers queued messages one at a time until `stop` fires or the sender is dropped.
pub(crate) async fn delivery_loop(
    subject: String,
    handler: Arc<dyn MessageHandler>,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    stop: CancellationToken,
    handler_timeout: Duration,
) {
    loop {
        tokio::select! {
            biased;
            () = stop.cancelled() => break,
            message = receiver.recv() => {
                let Some(message) = message else {
                    break;
                };
                deliver(&subject, handler.as_ref(), message, handler_timeout).await;
            }
        }
    }

    debug!(subject = %subject, "delivery loop finished");
}
