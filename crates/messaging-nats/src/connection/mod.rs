mod error;

use crate::config::NatsConnectionConfig;
use crate::subscription::{NatsSubscription, delivery_loop};
pub use error::Error;

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, Event, ServerAddr};
use async_trait::async_trait;
use herald_messaging::{
    Connection, DEFAULT_HANDLER_TIMEOUT, MessageHandler, validate_subject_pattern,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// A core NATS connection.
///
/// Reconnects forever with the client's default backoff. Lifecycle events are logged here
/// and never reach subscription owners.
#[derive(Clone, Debug)]
pub struct NatsConnection {
    client: Client,
    handler_timeout: Duration,
}

impl NatsConnection {
    /// Connects using `config`.
    ///
    /// # Errors
    /// Returns an error if the config is incomplete or no server could be reached.
    pub async fn connect(config: &NatsConnectionConfig) -> Result<Self, Error> {
        let servers = server_list(&config.hosts)?;
        let options = connect_options(config)?;

        let client = options.connect(servers).await?;
        info!(hosts = ?config.hosts, "connected to NATS");

        Ok(Self::from_client(client, config.handler_timeout()))
    }

    /// Wraps an already connected client.
    #[must_use]
    pub fn from_client(client: Client, handler_timeout: Option<Duration>) -> Self {
        Self {
            client,
            handler_timeout: handler_timeout.unwrap_or(DEFAULT_HANDLER_TIMEOUT),
        }
    }

    /// The underlying client, for publishing.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Drains every subscription and closes the connection.
    ///
    /// # Errors
    /// Returns an error if the client could not be drained.
    pub async fn close(&self) -> Result<(), Error> {
        self.client
            .drain()
            .await
            .map_err(|e| Error::Drain(e.to_string()))?;
        info!("NATS connection closed");
        Ok(())
    }
}

/// Validates every host and joins them into the comma-separated form the client accepts.
pub(crate) fn server_list(hosts: &[String]) -> Result<String, Error> {
    if hosts.is_empty() {
        return Err(Error::NoHosts);
    }

    for host in hosts {
        host.parse::<ServerAddr>()
            .map_err(|e| Error::InvalidHost {
                host: host.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(hosts.join(","))
}

pub(crate) fn connect_options(config: &NatsConnectionConfig) -> Result<ConnectOptions, Error> {
    let mut options = ConnectOptions::new()
        .retry_on_initial_connect()
        .max_reconnects(Option::<usize>::None)
        .connection_timeout(config.connection_timeout())
        .event_callback(|event| async move {
            match event {
                Event::Connected => info!("nats connected"),
                Event::Disconnected => warn!("nats disconnected"),
                other => warn!(event = %other, "nats connection event"),
            }
        });

    // Test servers run without authentication.
    if !config.is_test {
        let seed = config.nkey.clone().ok_or(Error::MissingNkey)?;
        options = options.nkey(seed);
    }

    Ok(options)
}

#[async_trait]
impl Connection for NatsConnection {
    type Error = Error;

    type Subscription = NatsSubscription;

    async fn subscribe(
        &self,
        subject: String,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<NatsSubscription, Error> {
        validate_subject_pattern(&subject)?;

        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| Error::Subscribe(e.to_string()))?;

        let (control_sender, control_receiver) = mpsc::channel(1);

        herald_safe::spawn(
            format!("nats subscription {subject}"),
            delivery_loop(
                subject.clone(),
                handler,
                subscriber,
                control_receiver,
                self.handler_timeout,
            ),
        );

        info!(subject = %subject, "consuming NATS subject started");

        Ok(NatsSubscription {
            subject,
            control: control_sender,
        })
    }

    async fn unsubscribe(&self, subscription: NatsSubscription) -> Result<(), Error> {
        let NatsSubscription { subject, control } = subscription;
        let (reply_sender, reply_receiver) = oneshot::channel();

        control
            .send(reply_sender)
            .await
            .map_err(|_| Error::SubscriptionClosed(subject.clone()))?;

        reply_receiver
            .await
            .map_err(|_| Error::SubscriptionClosed(subject.clone()))??;

        info!(subject = %subject, "consuming NATS subject stopped");

        Ok(())
    }
}
