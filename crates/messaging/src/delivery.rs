use crate::context::HandlerContext;
use crate::handler::MessageHandler;
use crate::message::Message;

use std::time::Duration;

use tracing::{debug, warn};

/// Default bound on a single handler invocation.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of handing one message to a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The handler returned `Ok`.
    Handled,

    /// The handler returned an error.
    Failed(String),

    /// The handler did not finish within the timeout.
    TimedOut,

    /// The handler panicked.
    Panicked,
}

impl Delivery {
    /// Whether the handler completed successfully.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Hands `message` to `handler`, bounded by `timeout` and isolated from panics.
///
/// The handler receives a [`HandlerContext`] whose deadline is the one enforced here.
/// Failures are logged against `subject` and reported in the returned [`Delivery`]; they
/// never end the caller's delivery loop.
pub async fn deliver(
    subject: &str,
    handler: &dyn MessageHandler,
    message: Message,
    timeout: Duration,
) -> Delivery {
    let task = format!("handler for subject {subject}");
    let ctx = HandlerContext::new(subject, timeout);
    let deadline = ctx.deadline();

    let outcome = herald_safe::isolate(task, async move {
        tokio::time::timeout_at(deadline, handler.handle(ctx, message)).await
    })
    .await;

    match outcome {
        Some(Ok(Ok(()))) => {
            debug!(subject, "message handled");
            Delivery::Handled
        }
        Some(Ok(Err(e))) => {
            warn!(subject, error = %e, "error handling message");
            Delivery::Failed(e.to_string())
        }
        Some(Err(_elapsed)) => {
            warn!(subject, timeout = ?timeout, "handler timed out");
            Delivery::TimedOut
        }
        None => Delivery::Panicked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, handler_fn};

    use std::io;

    #[tokio::test]
    async fn test_handled() {
        let handler = handler_fn(|_ctx: HandlerContext, _message: Message| async {
            Ok::<(), HandlerError>(())
        });

        let delivery = deliver(
            "orders.created",
            &handler,
            Message::new("orders.created", "a"),
            DEFAULT_HANDLER_TIMEOUT,
        )
        .await;

        assert!(delivery.is_handled());
    }

    #[tokio::test]
    async fn test_handler_error_is_reported() {
        let handler = handler_fn(|_ctx: HandlerContext, _message: Message| async {
            Err::<(), _>(io::Error::other("database down"))
        });

        let delivery = deliver(
            "orders.created",
            &handler,
            Message::new("orders.created", "a"),
            DEFAULT_HANDLER_TIMEOUT,
        )
        .await;

        assert_eq!(delivery, Delivery::Failed("database down".to_string()));
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let handler = handler_fn(|_ctx: HandlerContext, message: Message| async move {
            if message.payload[10] == b'x' {
                return Err("unexpected marker".into());
            }
            Ok::<(), HandlerError>(())
        });

        let delivery = deliver(
            "orders.created",
            &handler,
            Message::new("orders.created", "short"),
            DEFAULT_HANDLER_TIMEOUT,
        )
        .await;

        assert_eq!(delivery, Delivery::Panicked);
    }

    #[tokio::test]
    async fn test_handler_sees_delivery_deadline() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let handler = handler_fn(move |ctx: HandlerContext, _message: Message| {
            let sender = sender.clone();
            async move {
                sender.send(ctx)?;
                Ok::<(), HandlerError>(())
            }
        });

        let delivery = deliver(
            "orders.*",
            &handler,
            Message::new("orders.created", "a"),
            Duration::from_millis(750),
        )
        .await;
        assert!(delivery.is_handled());

        let ctx = receiver.try_recv().unwrap();
        assert_eq!(ctx.subscription(), "orders.*");
        assert!(ctx.remaining() <= Duration::from_millis(750));
        assert!(!ctx.is_expired());
    }

    #[tokio::test]
    async fn test_downstream_call_shares_deadline() {
        let handler = handler_fn(|ctx: HandlerContext, _message: Message| async move {
            tokio::time::timeout_at(ctx.deadline(), std::future::pending::<()>()).await?;
            Ok::<(), HandlerError>(())
        });

        let delivery = deliver(
            "orders.created",
            &handler,
            Message::new("orders.created", "a"),
            Duration::from_millis(50),
        )
        .await;

        // Whichever side observes the deadline first, the handler never succeeds.
        assert!(matches!(delivery, Delivery::TimedOut | Delivery::Failed(_)));
    }

    #[tokio::test]
    async fn test_slow_handler_times_out() {
        let handler = handler_fn(|_ctx: HandlerContext, _message: Message| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), HandlerError>(())
        });

        let delivery = deliver(
            "orders.created",
            &handler,
            Message::new("orders.created", "a"),
            Duration::from_millis(50),
        )
        .await;

        assert_eq!(delivery, Delivery::TimedOut);
    }
}
