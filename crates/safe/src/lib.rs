//! Crash isolation for asynchronous work.
//!
//! Every unit of work that must not take its siblings down goes through [`isolate`] or
//! [`spawn`]. A panic raised inside the work is caught at that boundary, logged together
//! with the backtrace captured where it happened, and turned into `None`.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod hook;

pub use hook::{PanicSite, install as install_panic_hook};

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::error;

/// Runs `work` to completion, converting a panic into `None`.
///
/// The panic message, location and backtrace are logged under `task`.
pub async fn isolate<F>(task: impl AsRef<str>, work: F) -> Option<F::Output>
where
    F: Future,
{
    hook::install();

    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(output) => Some(output),
        Err(payload) => {
            report(task.as_ref(), payload.as_ref());
            None
        }
    }
}

/// Spawns `work` on its own tokio task behind the same boundary as [`isolate`].
///
/// The returned handle never resolves to a `JoinError` caused by a panic in `work`.
///
/// # Panics
/// Panics if called outside of a tokio runtime.
pub fn spawn<F>(task: impl Into<String>, work: F) -> JoinHandle<Option<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let task = task.into();
    tokio::spawn(async move { isolate(task, work).await })
}

/// Extracts the human readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn report(task: &str, payload: &(dyn Any + Send)) {
    let message = panic_message(payload);

    match hook::take() {
        Some(site) => error!(
            task,
            panic = %message,
            location = site.location.as_deref().unwrap_or("unknown"),
            "[panic recovered]\n{}",
            site.backtrace
        ),
        None => error!(task, panic = %message, "[panic recovered] (no backtrace captured)"),
    }
}
