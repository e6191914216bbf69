use std::time::Duration;

use tokio::time::Instant;

/// Per-delivery context handed to a handler alongside its message.
///
/// The deadline is the instant the delivery gives up on the handler. Handlers pass it on to
/// downstream calls with [`tokio::time::timeout_at`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerContext {
    subscription: String,
    deadline: Instant,
}

impl HandlerContext {
    /// Context for a delivery on `subscription` that may run for `timeout`.
    pub fn new(subscription: impl Into<String>, timeout: Duration) -> Self {
        Self::with_deadline(subscription, Instant::now() + timeout)
    }

    /// Context for a delivery on `subscription` that must finish by `deadline`.
    pub fn with_deadline(subscription: impl Into<String>, deadline: Instant) -> Self {
        Self {
            subscription: subscription.into(),
            deadline,
        }
    }

    /// The subject (or pattern) the subscription was opened on.
    #[must_use]
    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    /// When the delivery stops waiting for the handler.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
