//! Consumes two order subjects from an in-memory bus, then shuts down.

use std::time::Duration;

use herald_consumer::{ConsumerManager, SinkPolicy, SubscriptionBinding, error_channel};
use herald_messaging::{HandlerContext, HandlerError, Message, handler_fn};
use herald_messaging_memory::MemoryConnection;
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn log_order(ctx: HandlerContext, message: Message) -> Result<(), HandlerError> {
    let body = std::str::from_utf8(&message.payload)?;
    info!(
        subject = %message.subject,
        subscription = ctx.subscription(),
        remaining = ?ctx.remaining(),
        body,
        "order event"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    herald_safe::install_panic_hook();

    let connection = MemoryConnection::default();

    let mut manager = ConsumerManager::new(connection.clone());
    manager.subscribe([
        SubscriptionBinding::new("orders.created", handler_fn(log_order)),
        SubscriptionBinding::new("orders.updated", handler_fn(log_order)),
        SubscriptionBinding::new("bad..subject", handler_fn(log_order)),
    ])?;

    let (sink, mut errors) = error_channel(SinkPolicy::Unbounded);
    manager.start(CancellationToken::new(), sink)?;
    manager.settled().await;

    for error in errors.drain() {
        info!(error = %error, "subscription failed to open");
    }

    connection.publish("orders.created", r#"{"id":1}"#)?;
    connection.publish("orders.updated", r#"{"id":1,"status":"paid"}"#)?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    manager.stop().await;

    Ok(())
}
