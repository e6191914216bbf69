//! Subscription lifecycle management on top of a message bus [`Connection`].
//!
//! A [`ConsumerManager`] collects subject/handler bindings, opens one subscription per
//! binding concurrently when started, and unsubscribes all of them when stopped:
//!
//! 1. [`ConsumerManager::subscribe`] registers bindings while the manager is idle.
//! 2. [`ConsumerManager::start`] launches one crash-isolated worker per binding and returns
//!    immediately. Workers that fail to open report on the [`ErrorSink`].
//! 3. Each open subscription delivers messages to its handler; handler errors, timeouts and
//!    panics are logged and delivery continues.
//! 4. [`ConsumerManager::stop`] waits for every worker to finish opening, then
//!    unsubscribes every active subscription, logging failures.
//!
//! A manager is single use: once stopped it cannot be started again.
//!
//! [`Connection`]: herald_messaging::Connection
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod binding;
mod error;
mod manager;
mod sink;
mod state;

pub use binding::SubscriptionBinding;
pub use error::Error;
pub use manager::ConsumerManager;
pub use sink::{ErrorReceiver, ErrorSink, SinkPolicy, error_channel};
pub use state::ManagerState;
