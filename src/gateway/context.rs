//! Per-request context handed to gateway calls.
//!
//! Besides the cancellation signal, the context carries the request id and
//! the tracing context of the operation span, so a gateway that talks to a
//! real backend can forward both (for example as headers).

use super::cancel::CancelSignal;
use crate::store::{Operation, RequestId};
use serde::{Deserialize, Serialize};

/// Distributed tracing context captured from the current span.
///
/// Holds the OpenTelemetry trace and span ids as hex strings, which is the
/// form they take on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the operation span, the parent of any remote span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the span
    /// is not sampled.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Everything a gateway call knows about the invocation it serves.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier of this invocation.
    pub request_id: RequestId,

    /// The operation being performed.
    pub operation: Operation,

    /// Raised when the caller abandons the invocation.
    pub cancel: CancelSignal,

    /// Trace context of the operation span, when tracing is exported.
    pub trace_context: Option<TraceContext>,
}

impl RequestContext {
    /// Creates a context bound to an existing cancellation signal.
    #[must_use]
    pub fn new(request_id: RequestId, operation: Operation, cancel: CancelSignal) -> Self {
        Self {
            request_id,
            operation,
            cancel,
            trace_context: TraceContext::from_current(),
        }
    }

    /// Creates a context for a direct gateway call outside the orchestrator.
    ///
    /// The cancellation signal can still be raised through the returned
    /// context's [`CancelSignal::cancel`].
    #[must_use]
    pub fn detached(operation: Operation) -> Self {
        Self::new(RequestId::generate(), operation, CancelSignal::new())
    }

    /// Returns `true` once the caller has abandoned this invocation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
