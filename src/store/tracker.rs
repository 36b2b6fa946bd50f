//! Single in-flight request tracking.
//!
//! The tracker owns the `loading` flag. Only the most recently started
//! invocation is tracked: a new start overwrites the previous id, and a
//! completion only releases the flag when it belongs to the tracked id.
//! Completions of superseded invocations therefore cannot clear a flag that
//! a newer invocation legitimately set.

use super::events::{Phase, RequestId};
use serde::{Deserialize, Serialize};

/// What a matching failure does to the tracked request id.
///
/// A matching success always clears both `loading` and the id. Failures
/// historically only cleared `loading`, leaving a stale id behind; that
/// behavior is kept available as [`FailurePolicy::RetainRequestId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Clear the id along with `loading`, so the id is set iff loading.
    #[default]
    ClearRequestId,
    /// Clear only `loading` and keep the failed request's id.
    RetainRequestId,
}

/// Loading state derived from lifecycle events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTracker {
    pub loading: bool,
    pub current_request_id: Option<RequestId>,
    #[serde(skip)]
    pub failure_policy: FailurePolicy,
}

impl RequestTracker {
    /// Creates an idle tracker with the given failure policy.
    #[must_use]
    pub fn new(failure_policy: FailurePolicy) -> Self {
        Self {
            loading: false,
            current_request_id: None,
            failure_policy,
        }
    }

    /// Returns `true` when `request_id` currently owns the loading state.
    #[must_use]
    pub fn is_tracking(&self, request_id: &RequestId) -> bool {
        self.loading && self.current_request_id.as_ref() == Some(request_id)
    }

    /// Routes a lifecycle phase to its transition.
    #[must_use]
    pub fn apply(self, phase: Phase, request_id: &RequestId) -> Self {
        match phase {
            Phase::Started => self.started(request_id.clone()),
            Phase::Succeeded => self.succeeded(request_id),
            Phase::Failed => self.failed(request_id),
        }
    }

    /// Tracks `request_id`, replacing whatever was tracked before.
    #[must_use]
    pub fn started(self, request_id: RequestId) -> Self {
        if let Some(previous) = self.current_request_id.as_ref().filter(|_| self.loading) {
            tracing::debug!(%previous, next = %request_id, "superseding tracked request");
        }
        Self {
            loading: true,
            current_request_id: Some(request_id),
            ..self
        }
    }

    /// Releases the loading state if `request_id` is the tracked one.
    #[must_use]
    pub fn succeeded(self, request_id: &RequestId) -> Self {
        if !self.is_tracking(request_id) {
            tracing::debug!(%request_id, "ignoring success of untracked request");
            return self;
        }
        Self {
            loading: false,
            current_request_id: None,
            ..self
        }
    }

    /// Releases the loading state if `request_id` is the tracked one.
    ///
    /// Whether the id is cleared depends on the [`FailurePolicy`].
    #[must_use]
    pub fn failed(self, request_id: &RequestId) -> Self {
        if !self.is_tracking(request_id) {
            tracing::debug!(%request_id, "ignoring failure of untracked request");
            return self;
        }
        let current_request_id = match self.failure_policy {
            FailurePolicy::ClearRequestId => None,
            FailurePolicy::RetainRequestId => self.current_request_id,
        };
        Self {
            loading: false,
            current_request_id,
            ..self
        }
    }
}
