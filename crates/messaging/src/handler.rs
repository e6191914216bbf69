use crate::context::HandlerContext;
use crate::message::Message;

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

/// Error returned by message handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Processes messages delivered on a subscription.
///
/// A handler is shared between the code that registered it and the connection delivering to
/// it, so it must not rely on `&mut self`. Invocations for one subscription never overlap.
#[async_trait]
pub trait MessageHandler
where
    Self: Send + Sync + 'static,
{
    /// Handles one message. `ctx` carries the delivery deadline.
    async fn handle(&self, ctx: HandlerContext, message: Message) -> Result<(), HandlerError>;
}

/// Adapts an async closure into a [`MessageHandler`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}

/// Wraps `f` so it can be used wherever a [`MessageHandler`] is expected.
pub const fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut, E> MessageHandler for HandlerFn<F>
where
    F: Fn(HandlerContext, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    async fn handle(&self, ctx: HandlerContext, message: Message) -> Result<(), HandlerError> {
        (self.0)(ctx, message).await.map_err(Into::into)
    }
}
