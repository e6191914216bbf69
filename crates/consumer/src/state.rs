use std::fmt;

/// Observable lifecycle of a [`ConsumerManager`](crate::ConsumerManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManagerState {
    /// Bindings are being registered.
    Idle,

    /// Started, with at least one subscription still opening.
    Starting,

    /// Started, and every open attempt has settled.
    Running,

    /// Stop was called and is waiting for opens or unsubscribing.
    Stopping,

    /// Every active subscription has been unsubscribed.
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        })
    }
}
