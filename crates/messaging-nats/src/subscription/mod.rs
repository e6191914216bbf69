use crate::connection::Error;

use std::sync::Arc;
use std::time::Duration;

use async_nats::{HeaderMap, Subscriber};
use futures::StreamExt;
use herald_messaging::{Headers, Message, MessageHandler, deliver};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub(crate) type UnsubscribeReply = oneshot::Sender<Result<(), Error>>;

/// Handle to a subscription opened on a [`NatsConnection`](crate::NatsConnection).
///
/// Dropping the handle without unsubscribing also ends the subscription.
#[derive(Debug)]
pub struct NatsSubscription {
    pub(crate) subject: String,
    pub(crate) control: mpsc::Sender<UnsubscribeReply>,
}

impl NatsSubscription {
    /// The subject (or pattern) the subscription was opened on.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Owns the NATS subscriber: delivers messages one at a time and performs the unsubscribe
/// when asked through `control`.
pub(crate) async fn delivery_loop(
    subject: String,
    handler: Arc<dyn MessageHandler>,
    mut subscriber: Subscriber,
    mut control: mpsc::Receiver<UnsubscribeReply>,
    handler_timeout: Duration,
) {
    loop {
        tokio::select! {
            biased;
            request = control.recv() => {
                let result = subscriber
                    .unsubscribe()
                    .await
                    .map_err(|e| Error::Unsubscribe(e.to_string()));

                match request {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            warn!(subject = %subject, error = %e, "failed to unsubscribe dropped subscription");
                        }
                    }
                }
                break;
            }
            message = subscriber.next() => {
                let Some(message) = message else {
                    break;
                };
                deliver(&subject, handler.as_ref(), into_message(message), handler_timeout).await;
            }
        }
    }

    debug!(subject = %subject, "delivery loop finished");
}

fn into_message(message: async_nats::Message) -> Message {
    Message {
        subject: message.subject.to_string(),
        headers: message.headers.as_ref().and_then(extract_headers),
        reply: message.reply.map(|reply| reply.to_string()),
        payload: message.payload,
    }
}

fn extract_headers(headers: &HeaderMap) -> Option<Headers> {
    let mut result = Headers::new();
    for (key, value) in headers.iter() {
        result.insert(
            key.to_string(),
            value.first().map(ToString::to_string).unwrap_or_default(),
        );
    }
    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}
