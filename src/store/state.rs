//! Store state snapshot.
//!
//! [`BlogState`] is the single source of truth for the post collection, the
//! post open for editing, and the loading state. Snapshots are plain values:
//! the store hands out clones, and transitions build a new value instead of
//! poking fields of a shared one.

use super::tracker::{FailurePolicy, RequestTracker};
use super::events::RequestId;
use crate::domain::{Post, PostId};
use serde::Serialize;

/// Snapshot of everything the UI renders from.
///
/// Serializes as `{ postList, editingPost, loading, currentRequestId }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogState {
    /// Known posts in insertion order, ids unique.
    pub post_list: Vec<Post>,

    /// The post currently open for editing, if any.
    ///
    /// Always refers to a post present in `post_list` at the time it was
    /// selected; cleared when that post is updated or deleted.
    pub editing_post: Option<Post>,

    /// Loading flag and tracked request id.
    #[serde(flatten)]
    pub request: RequestTracker,
}

impl BlogState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state seeded with `posts`, nothing selected, idle.
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            post_list: posts,
            ..Self::default()
        }
    }

    /// Replaces the failure policy used by the request tracker.
    #[must_use]
    pub fn with_failure_policy(self, failure_policy: FailurePolicy) -> Self {
        Self {
            request: RequestTracker {
                failure_policy,
                ..self.request
            },
            ..self
        }
    }

    /// Returns `true` while a tracked operation is in flight.
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.request.loading
    }

    /// Returns the id of the tracked operation, if any.
    #[must_use]
    pub const fn current_request_id(&self) -> Option<&RequestId> {
        self.request.current_request_id.as_ref()
    }

    /// Looks up a post by id.
    #[must_use]
    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.post_list.iter().find(|post| &post.id == id)
    }

    /// Returns the position of the first post with `id`.
    #[must_use]
    pub fn position(&self, id: &PostId) -> Option<usize> {
        self.post_list.iter().position(|post| &post.id == id)
    }
}
