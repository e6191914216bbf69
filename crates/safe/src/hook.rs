use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

/// Details of the most recent panic observed on the current thread.
#[derive(Debug)]
pub struct PanicSite {
    /// `file:line:column` of the panic, when known.
    pub location: Option<String>,

    /// Backtrace taken inside the panic hook, before unwinding.
    pub backtrace: Backtrace,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Installs a process-wide panic hook that records where each panic happened and emits
/// it as a `tracing` event.
///
/// Replaces the default hook, so panics never reach stderr outside of `tracing`.
/// Calling this more than once is a no-op.
pub fn install() {
    INSTALL.call_once(|| {
        panic::set_hook(Box::new(|info: &PanicHookInfo<'_>| {
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture(),
            };
            LAST_PANIC.with(|cell| *cell.borrow_mut() = Some(site));
            tracing_panic::panic_hook(info);
        }));
    });
}

/// Takes the panic site recorded for the current thread, if any.
pub fn take() -> Option<PanicSite> {
    LAST_PANIC.with(|cell| cell.borrow_mut().take())
}
