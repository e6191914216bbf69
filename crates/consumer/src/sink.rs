use crate::error::Error;

use tokio::sync::mpsc;
use tracing::warn;

/// Capacity and backpressure policy for the channel open failures are reported on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkPolicy {
    /// Never blocks and never drops. Memory grows if the receiver is not drained.
    #[default]
    Unbounded,

    /// Holds up to `n` reports; a reporting worker waits for space.
    ///
    /// Workers waiting here have already settled their open attempt, so a full channel
    /// never holds up `stop`.
    Block(usize),

    /// Holds up to `n` reports; further reports are logged and dropped.
    DropNewest(usize),
}

#[derive(Clone, Debug)]
enum Sender {
    Unbounded(mpsc::UnboundedSender<Error>),
    Block(mpsc::Sender<Error>),
    DropNewest(mpsc::Sender<Error>),
}

/// Sending half of the error channel. Cheap to clone; one clone per worker.
#[derive(Clone, Debug)]
pub struct ErrorSink {
    sender: Sender,
}

impl ErrorSink {
    /// Reports `error`, applying the channel's policy.
    ///
    /// Returns `false` if the report was dropped, either because the channel is full under
    /// [`SinkPolicy::DropNewest`] or because the receiver is gone.
    pub async fn report(&self, error: Error) -> bool {
        let result = match &self.sender {
            Sender::Unbounded(sender) => sender.send(error).map_err(|e| e.0),
            Sender::Block(sender) => sender.send(error).await.map_err(|e| e.0),
            Sender::DropNewest(sender) => sender.try_send(error).map_err(|e| match e {
                mpsc::error::TrySendError::Full(error)
                | mpsc::error::TrySendError::Closed(error) => error,
            }),
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "error sink unavailable, dropping report");
                false
            }
        }
    }
}

impl From<mpsc::UnboundedSender<Error>> for ErrorSink {
    fn from(sender: mpsc::UnboundedSender<Error>) -> Self {
        Self {
            sender: Sender::Unbounded(sender),
        }
    }
}

impl From<mpsc::Sender<Error>> for ErrorSink {
    /// Wraps a bounded sender with [`SinkPolicy::Block`] semantics.
    fn from(sender: mpsc::Sender<Error>) -> Self {
        Self {
            sender: Sender::Block(sender),
        }
    }
}

#[derive(Debug)]
enum Receiver {
    Unbounded(mpsc::UnboundedReceiver<Error>),
    Bounded(mpsc::Receiver<Error>),
}

/// Receiving half of the error channel.
#[derive(Debug)]
pub struct ErrorReceiver {
    receiver: Receiver,
}

impl ErrorReceiver {
    /// Waits for the next report. Returns `None` once every sink clone is dropped.
    pub async fn recv(&mut self) -> Option<Error> {
        match &mut self.receiver {
            Receiver::Unbounded(receiver) => receiver.recv().await,
            Receiver::Bounded(receiver) => receiver.recv().await,
        }
    }

    /// Returns a report if one is immediately available.
    pub fn try_recv(&mut self) -> Option<Error> {
        match &mut self.receiver {
            Receiver::Unbounded(receiver) => receiver.try_recv().ok(),
            Receiver::Bounded(receiver) => receiver.try_recv().ok(),
        }
    }

    /// Takes every report that is immediately available.
    pub fn drain(&mut self) -> Vec<Error> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Creates an error channel with the given policy.
///
/// Bounded capacities of zero are raised to one.
#[must_use]
pub fn error_channel(policy: SinkPolicy) -> (ErrorSink, ErrorReceiver) {
    match policy {
        SinkPolicy::Unbounded => {
            let (sender, receiver) = mpsc::unbounded_channel();
            (
                ErrorSink {
                    sender: Sender::Unbounded(sender),
                },
                ErrorReceiver {
                    receiver: Receiver::Unbounded(receiver),
                },
            )
        }
        SinkPolicy::Block(capacity) | SinkPolicy::DropNewest(capacity) => {
            let (sender, receiver) = mpsc::channel(capacity.max(1));
            let sender = if matches!(policy, SinkPolicy::Block(_)) {
                Sender::Block(sender)
            } else {
                Sender::DropNewest(sender)
            };
            (
                ErrorSink { sender },
                ErrorReceiver {
                    receiver: Receiver::Bounded(receiver),
                },
            )
        }
    }
}
