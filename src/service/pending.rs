//! Handle to an in-flight operation.

use crate::domain::{GatewayError, OperationError};
use crate::gateway::CancelSignal;
use crate::store::{Event, Operation, RequestId, Store};
use futures_util::future::LocalBoxFuture;
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Shared "terminal event already dispatched" flag of one invocation.
///
/// Exactly one of completion, [`Pending::abort`] and drop gets to emit the
/// terminal lifecycle event.
#[derive(Debug, Clone, Default)]
pub(crate) struct Settled(Rc<Cell<bool>>);

impl Settled {
    /// Marks the invocation settled. Returns `false` if it already was.
    pub(crate) fn claim(&self) -> bool {
        !self.0.replace(true)
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.0.get()
    }
}

/// An operation that has started and not necessarily settled.
///
/// Resolves to the gateway's value on success. The `Started` event has
/// already been dispatched when a `Pending` is handed out; the terminal
/// event is dispatched when the operation completes, when
/// [`abort`](Self::abort) is called, or when the handle is dropped before
/// either, whichever comes first. An abandoned operation therefore always
/// releases the loading state it may own.
#[must_use = "dropping a pending operation abandons it"]
pub struct Pending<T> {
    request_id: RequestId,
    operation: Operation,
    cancel: CancelSignal,
    settled: Settled,
    store: Store,
    future: LocalBoxFuture<'static, Result<T, OperationError>>,
}

impl<T> Pending<T> {
    pub(crate) fn new(
        request_id: RequestId,
        operation: Operation,
        cancel: CancelSignal,
        settled: Settled,
        store: Store,
        future: LocalBoxFuture<'static, Result<T, OperationError>>,
    ) -> Self {
        Self {
            request_id,
            operation,
            cancel,
            settled,
            store,
            future,
        }
    }

    /// Identifier allocated for this invocation.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// The operation being performed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns `true` once the terminal event has been dispatched.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.is_settled()
    }

    /// Abandons the operation.
    ///
    /// Raises the gateway's cancellation signal and, unless the operation has
    /// already settled, dispatches `Failed` right away. Awaiting the handle
    /// afterwards yields [`GatewayError::Cancelled`].
    pub fn abort(&self) {
        self.cancel.cancel();
        abandon(&self.store, &self.settled, self.operation, &self.request_id, "aborted");
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        if self.settled.is_settled() {
            return;
        }
        self.cancel.cancel();
        abandon(&self.store, &self.settled, self.operation, &self.request_id, "dropped before settling");
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("request_id", &self.request_id)
            .field("operation", &self.operation)
            .field("settled", &self.settled.is_settled())
            .finish_non_exhaustive()
    }
}

/// Dispatches the terminal `Failed` event of an abandoned invocation.
pub(crate) fn abandon(
    store: &Store,
    settled: &Settled,
    operation: Operation,
    request_id: &RequestId,
    why: &str,
) {
    if !settled.claim() {
        return;
    }
    tracing::debug!(%operation, %request_id, why, "operation abandoned");
    store.dispatch(Event::Failed {
        operation,
        request_id: request_id.clone(),
        reason: GatewayError::Cancelled.to_string(),
    });
}
