use crate::binding::SubscriptionBinding;
use crate::error::Error;
use crate::sink::ErrorSink;
use crate::state::ManagerState;

use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use herald_messaging::Connection;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Started,
    Stopping,
    Stopped,
}

#[derive(Debug)]
struct ActiveSubscription<S> {
    subject: String,
    handle: S,
}

type ActiveSet<S> = Arc<tokio::sync::Mutex<Vec<ActiveSubscription<S>>>>;

/// A worker's claim on the pending count. Wakes `settled` waiters when the last one drops.
struct PendingOpen {
    token: Option<TaskTrackerToken>,
    settled: Arc<Notify>,
}

impl Drop for PendingOpen {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            let tracker = token.task_tracker().clone();
            drop(token);

            if tracker.is_empty() {
                self.settled.notify_waiters();
            }
        }
    }
}

/// Opens, tracks and closes one subscription per registered binding.
pub struct ConsumerManager<C>
where
    C: Connection,
{
    connection: C,
    bindings: Vec<SubscriptionBinding>,
    lifecycle: watch::Sender<Lifecycle>,
    active: ActiveSet<C::Subscription>,
    opening: TaskTracker,
    settled: Arc<Notify>,
}

impl<C> fmt::Debug for ConsumerManager<C>
where
    C: Connection,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerManager")
            .field("connection", &self.connection)
            .field("bindings", &self.bindings)
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl<C> ConsumerManager<C>
where
    C: Connection,
{
    /// Creates an idle manager consuming through `connection`.
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            bindings: Vec::new(),
            lifecycle: watch::Sender::new(Lifecycle::Idle),
            active: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            opening: TaskTracker::new(),
            settled: Arc::new(Notify::new()),
        }
    }

    /// Registers bindings, in order. Subjects are not validated until `start`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] once the manager has been started or stopped.
    pub fn subscribe<I>(&mut self, bindings: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = SubscriptionBinding>,
    {
        self.expect_idle("subscribe")?;
        self.bindings.extend(bindings);
        Ok(())
    }

    /// Launches one worker per binding, in registration order, and returns immediately.
    ///
    /// Each worker opens its subscription and records it, or reports the failure on
    /// `errors` and exits. Cancelling `ctx` abandons opens that are still in flight; they
    /// are reported as [`Error::Cancelled`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] unless the manager is idle.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn start(&self, ctx: CancellationToken, errors: impl Into<ErrorSink>) -> Result<(), Error> {
        let mut pending = Vec::with_capacity(self.bindings.len());
        let mut rejected = None;

        // Claims are taken under the lifecycle lock so `Started` is never observed with an
        // empty pending count before the workers exist.
        self.lifecycle.send_if_modified(|lifecycle| {
            if *lifecycle != Lifecycle::Idle {
                rejected = Some(*lifecycle);
                return false;
            }

            pending.extend(self.bindings.iter().map(|_| PendingOpen {
                token: Some(self.opening.token()),
                settled: self.settled.clone(),
            }));
            *lifecycle = Lifecycle::Started;
            true
        });

        if let Some(lifecycle) = rejected {
            return Err(Error::InvalidState {
                operation: "start",
                state: self.observe(lifecycle),
            });
        }

        let errors = errors.into();

        for (binding, pending) in self.bindings.iter().zip(pending) {
            herald_safe::spawn(
                format!("open subject {}", binding.subject()),
                open_subscription(
                    self.connection.clone(),
                    binding.clone(),
                    self.active.clone(),
                    errors.clone(),
                    ctx.clone(),
                    pending,
                ),
            );
        }

        info!(bindings = self.bindings.len(), "consumer manager started");

        Ok(())
    }

    /// Waits for every open attempt to settle, then unsubscribes every active subscription.
    ///
    /// Unsubscribe failures are logged and do not stop the remaining unsubscribes. A call
    /// made while another `stop` is running waits for that one to finish; a call made
    /// afterwards returns immediately. Stopping an idle manager retires it without opening
    /// anything.
    pub async fn stop(&self) {
        let mut previous = Lifecycle::Idle;

        self.lifecycle.send_if_modified(|lifecycle| {
            previous = *lifecycle;
            match previous {
                Lifecycle::Idle => *lifecycle = Lifecycle::Stopped,
                Lifecycle::Started => *lifecycle = Lifecycle::Stopping,
                Lifecycle::Stopping | Lifecycle::Stopped => return false,
            }
            true
        });

        match previous {
            Lifecycle::Idle => {
                self.opening.close();
                info!("consumer manager stopped before start");
                return;
            }
            Lifecycle::Stopping => {
                debug!("waiting for the stop in progress");
                let _ = self
                    .lifecycle
                    .subscribe()
                    .wait_for(|lifecycle| *lifecycle == Lifecycle::Stopped)
                    .await;
                return;
            }
            Lifecycle::Stopped => {
                debug!("consumer manager already stopped");
                return;
            }
            Lifecycle::Started => {}
        }

        self.opening.close();
        self.opening.wait().await;

        let drained = std::mem::take(&mut *self.active.lock().await);
        let total = drained.len();
        let mut failed = 0_usize;

        for ActiveSubscription { subject, handle } in drained {
            match self.connection.unsubscribe(handle).await {
                Ok(()) => debug!(subject = %subject, "unsubscribed"),
                Err(e) => {
                    failed += 1;
                    warn!(subject = %subject, error = %e, "failed to unsubscribe");
                }
            }
        }

        self.lifecycle.send_replace(Lifecycle::Stopped);

        info!(total, failed, "consumer manager stopped");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ManagerState {
        let lifecycle = *self.lifecycle.borrow();
        self.observe(lifecycle)
    }

    /// Number of workers that have not finished their open attempt.
    pub fn pending(&self) -> usize {
        self.opening.len()
    }

    /// Registered bindings, in registration order.
    pub fn bindings(&self) -> &[SubscriptionBinding] {
        &self.bindings
    }

    /// Subjects of the currently active subscriptions, in the order they opened.
    pub async fn active_subjects(&self) -> Vec<String> {
        self.active
            .lock()
            .await
            .iter()
            .map(|active| active.subject.clone())
            .collect()
    }

    /// Waits until every open attempt launched by `start` has settled.
    ///
    /// Returns immediately if the manager was never started.
    pub async fn settled(&self) {
        loop {
            let mut notified = pin!(self.settled.notified());
            notified.as_mut().enable();

            if self.opening.is_empty() {
                return;
            }

            notified.await;
        }
    }

    fn observe(&self, lifecycle: Lifecycle) -> ManagerState {
        match lifecycle {
            Lifecycle::Idle => ManagerState::Idle,
            Lifecycle::Started if self.opening.is_empty() => ManagerState::Running,
            Lifecycle::Started => ManagerState::Starting,
            Lifecycle::Stopping => ManagerState::Stopping,
            Lifecycle::Stopped => ManagerState::Stopped,
        }
    }

    fn expect_idle(&self, operation: &'static str) -> Result<(), Error> {
        let lifecycle = *self.lifecycle.borrow();
        if lifecycle == Lifecycle::Idle {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.observe(lifecycle),
            })
        }
    }
}

async fn open_subscription<C>(
    connection: C,
    binding: SubscriptionBinding,
    active: ActiveSet<C::Subscription>,
    errors: ErrorSink,
    ctx: CancellationToken,
    pending: PendingOpen,
) where
    C: Connection,
{
    let subject = binding.subject().to_string();

    let opened = tokio::select! {
        biased;
        () = ctx.cancelled() => Err(Error::Cancelled { subject: subject.clone() }),
        result = connection.subscribe(subject.clone(), binding.handler().clone()) => {
            result.map_err(|e| Error::Open {
                subject: subject.clone(),
                source: Box::new(e),
            })
        }
    };

    match opened {
        Ok(handle) => {
            active.lock().await.push(ActiveSubscription {
                subject: subject.clone(),
                handle,
            });
            drop(pending);
            info!(subject = %subject, "subscription active");
        }
        Err(error) => {
            drop(pending);
            warn!(subject = %subject, error = %error, "failed to open subscription");
            errors.report(error).await;
        }
    }
}
