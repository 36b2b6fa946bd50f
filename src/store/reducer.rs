//! Pure state transitions.
//!
//! [`reduce`] maps a previous [`BlogState`] and an [`Event`] to the next
//! state. It never fails: lookups that miss leave the collection as it was,
//! since a successful remote operation against a slightly stale cache is not
//! an error on the client.
//!
//! Collection transitions run first, then the request tracker sees the
//! lifecycle phase of the same event. A success therefore lands in the
//! collection and releases `loading` in a single transition.

use super::events::{Event, Outcome};
use super::state::BlogState;
use crate::domain::{Post, PostId};

/// Computes the state that follows `event`.
///
/// # Examples
///
/// ```
/// use postboard::domain::NewPost;
/// use postboard::store::{reduce, BlogState, Event, Operation, Outcome, RequestId};
///
/// let post = NewPost::new("A", "", "2024-01-01T00:00").with_id("1");
/// let state = reduce(
///     BlogState::new(),
///     &Event::Started { operation: Operation::Create, request_id: RequestId::from("r1") },
/// );
/// assert!(state.loading());
///
/// let state = reduce(
///     state,
///     &Event::Succeeded { request_id: RequestId::from("r1"), outcome: Outcome::Created(post) },
/// );
/// assert!(!state.loading());
/// assert_eq!(state.post_list.len(), 1);
/// ```
#[must_use]
pub fn reduce(state: BlogState, event: &Event) -> BlogState {
    let _span = tracing::debug_span!("reduce", event = event.name()).entered();

    let state = match event {
        Event::Succeeded { outcome, .. } => apply_outcome(state, outcome),
        Event::StartEditing(id) => start_editing(state, id),
        Event::CancelEditing => cancel_editing(state),
        Event::Started {
            operation,
            request_id,
        } => {
            tracing::debug!(%operation, %request_id, "operation started");
            state
        }
        Event::Failed {
            operation,
            request_id,
            reason,
        } => {
            tracing::debug!(%operation, %request_id, %reason, "failure recorded");
            state
        }
    };

    match event.lifecycle() {
        Some((phase, request_id)) => BlogState {
            request: state.request.apply(phase, request_id),
            ..state
        },
        None => state,
    }
}

/// Applies the collection side of a successful operation.
#[must_use]
pub fn apply_outcome(state: BlogState, outcome: &Outcome) -> BlogState {
    match outcome {
        Outcome::Listed(posts) => replace_all(state, posts),
        Outcome::Created(post) => append(state, post),
        Outcome::Updated(post) => replace(state, post),
        Outcome::Deleted(id) => remove(state, id),
    }
}

fn replace_all(state: BlogState, posts: &[Post]) -> BlogState {
    tracing::debug!(count = posts.len(), "replacing post list");
    BlogState {
        post_list: posts.to_vec(),
        ..state
    }
}

fn append(state: BlogState, post: &Post) -> BlogState {
    // Ids stay unique even if the remote side hands back one we already hold.
    if state.position(&post.id).is_some() {
        tracing::warn!(post_id = %post.id, "created post id already present, replacing");
        return BlogState {
            post_list: splice(state.post_list, post),
            ..state
        };
    }

    let mut post_list = state.post_list;
    post_list.push(post.clone());
    BlogState { post_list, ..state }
}

fn replace(state: BlogState, post: &Post) -> BlogState {
    if state.position(&post.id).is_none() {
        tracing::debug!(post_id = %post.id, "updated post not in list");
    }
    BlogState {
        post_list: splice(state.post_list, post),
        editing_post: None,
        ..state
    }
}

fn splice(post_list: Vec<Post>, replacement: &Post) -> Vec<Post> {
    let mut replaced = false;
    post_list
        .into_iter()
        .map(|post| {
            if !replaced && post.id == replacement.id {
                replaced = true;
                replacement.clone()
            } else {
                post
            }
        })
        .collect()
}

fn remove(state: BlogState, id: &PostId) -> BlogState {
    let Some(index) = state.position(id) else {
        tracing::debug!(post_id = %id, "deleted post not in list");
        return state;
    };

    let mut post_list = state.post_list;
    post_list.remove(index);

    let editing_post = state
        .editing_post
        .filter(|editing| &editing.id != id);

    BlogState {
        post_list,
        editing_post,
        ..state
    }
}

fn start_editing(state: BlogState, id: &PostId) -> BlogState {
    let editing_post = state.find(id).cloned();
    if editing_post.is_none() {
        tracing::debug!(post_id = %id, "post to edit not in list");
    }
    BlogState {
        editing_post,
        ..state
    }
}

fn cancel_editing(state: BlogState) -> BlogState {
    BlogState {
        editing_post: None,
        ..state
    }
}
