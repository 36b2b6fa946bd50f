//! Events consumed by the store.
//!
//! Every change to a [`BlogState`](super::BlogState) is the result of one
//! [`Event`]. Lifecycle events (`Started`, `Succeeded`, `Failed`) carry the
//! [`RequestId`] of the operation invocation they belong to; the request
//! tracker uses it to ignore completions of superseded operations.

use crate::domain::{Post, PostId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one operation invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Allocates a fresh, globally unique request identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The remote operations the store knows how to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Stable name used in logs and spans.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "posts/list",
            Self::Create => "posts/create",
            Self::Update => "posts/update",
            Self::Delete => "posts/delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain result of a successful operation.
///
/// Applied to the collection in the same transition that releases the
/// request tracker, so no snapshot ever shows one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The full collection as returned by the remote side.
    Listed(Vec<Post>),
    /// A newly created post.
    Created(Post),
    /// The remote side's version of an updated post.
    Updated(Post),
    /// The identifier of a deleted post.
    Deleted(PostId),
}

impl Outcome {
    /// Returns the operation this outcome settles.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Listed(_) => Operation::List,
            Self::Created(_) => Operation::Create,
            Self::Updated(_) => Operation::Update,
            Self::Deleted(_) => Operation::Delete,
        }
    }
}

/// Lifecycle phase of an operation invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Started,
    Succeeded,
    Failed,
}

/// An input to the store's transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An operation invocation began.
    Started {
        operation: Operation,
        request_id: RequestId,
    },

    /// An operation invocation succeeded with a domain outcome.
    Succeeded {
        request_id: RequestId,
        outcome: Outcome,
    },

    /// An operation invocation failed or was abandoned.
    Failed {
        operation: Operation,
        request_id: RequestId,
        /// Human-readable failure description, kept for logs.
        reason: String,
    },

    /// Opens the post with the given id for editing.
    StartEditing(PostId),

    /// Closes the current edit session without saving.
    CancelEditing,
}

impl Event {
    /// Returns the lifecycle phase and request id of lifecycle events.
    #[must_use]
    pub const fn lifecycle(&self) -> Option<(Phase, &RequestId)> {
        match self {
            Self::Started { request_id, .. } => Some((Phase::Started, request_id)),
            Self::Succeeded { request_id, .. } => Some((Phase::Succeeded, request_id)),
            Self::Failed { request_id, .. } => Some((Phase::Failed, request_id)),
            Self::StartEditing(_) | Self::CancelEditing => None,
        }
    }

    /// Short event name for spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::StartEditing(_) => "start_editing",
            Self::CancelEditing => "cancel_editing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();

        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn editing_events_are_not_lifecycle_events() {
        assert!(Event::CancelEditing.lifecycle().is_none());
        assert!(Event::StartEditing(PostId::from("1")).lifecycle().is_none());

        let started = Event::Started {
            operation: Operation::List,
            request_id: RequestId::from("r1"),
        };
        assert_eq!(
            started.lifecycle(),
            Some((Phase::Started, &RequestId::from("r1")))
        );
    }
}
