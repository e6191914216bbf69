//! NATS implementation of the messaging crate.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Connection settings, loadable from YAML.
pub mod config;

/// Connections open core NATS subscriptions.
pub mod connection;

/// Subscriptions deliver NATS messages to their handlers.
pub mod subscription;

pub use config::NatsConnectionConfig;
pub use connection::{Error, NatsConnection};
pub use subscription::NatsSubscription;
