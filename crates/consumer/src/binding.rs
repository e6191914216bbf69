use std::fmt;
use std::sync::Arc;

use herald_messaging::MessageHandler;

/// Pairs a subject with the handler that consumes it.
///
/// Two bindings are equal when they name the same subject and share the same handler
/// instance. Registering equal bindings twice opens two independent subscriptions.
#[derive(Clone)]
pub struct SubscriptionBinding {
    subject: String,
    handler: Arc<dyn MessageHandler>,
}

impl SubscriptionBinding {
    /// Binds `handler` to `subject`.
    pub fn new<H>(subject: impl Into<String>, handler: H) -> Self
    where
        H: MessageHandler,
    {
        Self::shared(subject, Arc::new(handler))
    }

    /// Binds an already shared handler to `subject`.
    pub fn shared(subject: impl Into<String>, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            subject: subject.into(),
            handler,
        }
    }

    /// The subject to consume.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The handler messages are delivered to.
    #[must_use]
    pub const fn handler(&self) -> &Arc<dyn MessageHandler> {
        &self.handler
    }
}

impl fmt::Debug for SubscriptionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionBinding")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SubscriptionBinding {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
            && std::ptr::addr_eq(Arc::as_ptr(&self.handler), Arc::as_ptr(&other.handler))
    }
}

impl Eq for SubscriptionBinding {}
