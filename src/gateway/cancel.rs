//! Cooperative cancellation.
//!
//! A [`CancelSignal`] is a clonable view of a `futures_util` abort handle.
//! The orchestrator wraps every gateway future in [`Abortable`] with the
//! matching registration, so raising the signal stops the orchestrator from
//! waiting on the gateway. Gateways may additionally check
//! [`CancelSignal::is_cancelled`] to skip work, but nothing relies on them
//! doing so promptly.

use futures_util::future::{AbortHandle, AbortRegistration, Abortable};
use std::future::Future;

/// Clonable cancellation flag shared between a caller and a gateway call.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    handle: AbortHandle,
}

impl CancelSignal {
    /// Creates a signal whose registration is not attached to any future.
    #[must_use]
    pub fn new() -> Self {
        Self::pair().0
    }

    /// Creates a signal and the registration that makes a future abortable.
    #[must_use]
    pub fn pair() -> (Self, AbortRegistration) {
        let (handle, registration) = AbortHandle::new_pair();
        (Self { handle }, registration)
    }

    /// Raises the signal. Idempotent.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps `future` so it resolves to `Err(Aborted)` once its signal is raised.
pub fn abortable<F: Future>(future: F, registration: AbortRegistration) -> Abortable<F> {
    Abortable::new(future, registration)
}
