mod error;

use crate::subscription::{MemorySubscription, delivery_loop};
pub use error::Error;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use herald_messaging::{
    Connection, DEFAULT_HANDLER_TIMEOUT, Message, MessageHandler, subject_matches_pattern,
    validate_subject, validate_subject_pattern,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Options for new in-memory connections.
#[derive(Clone, Debug, Default)]
pub struct MemoryConnectionOptions {
    /// Bound on a single handler invocation. Defaults to 2 seconds.
    pub handler_timeout: Option<Duration>,
}

struct Route {
    pattern: String,
    sender: mpsc::UnboundedSender<Message>,
    stop: CancellationToken,
}

#[derive(Default)]
struct State {
    closed: bool,
    next_id: u64,
    routes: HashMap<u64, Route>,
}

/// An in-process message bus connection.
///
/// Every clone shares the same routing table, so a clone can publish to subscriptions
/// opened through another.
#[derive(Clone)]
pub struct MemoryConnection {
    handler_timeout: Duration,
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("handler_timeout", &self.handler_timeout)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new(MemoryConnectionOptions::default())
    }
}

impl MemoryConnection {
    /// Creates a new connection with its own routing table.
    #[must_use]
    pub fn new(MemoryConnectionOptions { handler_timeout }: MemoryConnectionOptions) -> Self {
        Self {
            handler_timeout: handler_timeout.unwrap_or(DEFAULT_HANDLER_TIMEOUT),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Publishes `payload` on `subject`.
    ///
    /// Returns the number of subscriptions the message was queued for.
    ///
    /// # Errors
    /// Returns an error if the subject is not a valid literal subject or the connection is
    /// closed.
    pub fn publish(&self, subject: impl Into<String>, payload: impl Into<Bytes>) -> Result<usize, Error> {
        self.publish_message(Message::new(subject, payload))
    }

    /// Publishes a fully formed message.
    ///
    /// # Errors
    /// Returns an error if the subject is not a valid literal subject or the connection is
    /// closed.
    pub fn publish_message(&self, message: Message) -> Result<usize, Error> {
        validate_subject(&message.subject)?;

        let state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        let mut queued = 0;
        for route in state.routes.values() {
            if subject_matches_pattern(&message.subject, &route.pattern)
                && route.sender.send(message.clone()).is_ok()
            {
                queued += 1;
            }
        }
        drop(state);

        debug!(subject = %message.subject, queued, "published message");

        Ok(queued)
    }

    /// Number of subscriptions currently open.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.lock().routes.len()
    }

    /// Closes the connection, ending every open subscription.
    pub fn close(&self) {
        let routes = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.routes)
        };

        for route in routes.into_values() {
            route.stop.cancel();
        }

        info!("memory connection closed");
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    type Error = Error;

    type Subscription = MemorySubscription;

    async fn subscribe(
        &self,
        subject: String,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<MemorySubscription, Error> {
        validate_subject_pattern(&subject)?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let stop = CancellationToken::new();

        let id = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(Error::Closed);
            }

            let id = state.next_id;
            state.next_id += 1;
            state.routes.insert(
                id,
                Route {
                    pattern: subject.clone(),
                    sender,
                    stop: stop.clone(),
                },
            );
            id
        };

        herald_safe::spawn(
            format!("memory subscription {subject}"),
            delivery_loop(
                subject.clone(),
                handler,
                receiver,
                stop.clone(),
                self.handler_timeout,
            ),
        );

        info!(subject = %subject, id, "subscribed");

        Ok(MemorySubscription { id, subject, stop })
    }

    async fn unsubscribe(&self, subscription: MemorySubscription) -> Result<(), Error> {
        let removed = self.state.lock().routes.remove(&subscription.id);

        if removed.is_none() {
            return Err(Error::NotSubscribed {
                id: subscription.id,
                subject: subscription.subject,
            });
        }

        subscription.stop.cancel();
        info!(subject = %subscription.subject, id = subscription.id, "unsubscribed");

        Ok(())
    }
}
