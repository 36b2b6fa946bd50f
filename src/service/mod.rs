//! Operation orchestration.
//!
//! [`PostService`] wraps each gateway call in the request lifecycle:
//!
//! ```text
//! call ─▶ Started ─▶ gateway future ─┬─ Ok(value)  ─▶ Succeeded { outcome } ─▶ Ok(value)
//!                                    ├─ Err(error) ─▶ Failed                ─▶ Err(classified)
//!                                    └─ aborted    ─▶ Failed                ─▶ Err(Cancelled)
//! ```
//!
//! `Started` is dispatched synchronously when the operation is issued, so
//! Started events follow issuance order even though completions may arrive
//! in any order. Failures are classified at this boundary: a validation
//! rejection of an update becomes [`OperationError::Rejected`], everything
//! else [`OperationError::Fatal`].
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use postboard::domain::NewPost;
//! use postboard::gateway::MemoryGateway;
//! use postboard::service::PostService;
//! use postboard::store::Store;
//!
//! let service = PostService::new(Store::new(), MemoryGateway::new());
//!
//! let created = block_on(service.create(NewPost::new("Hello", "", "2024-01-01T08:00"))).unwrap();
//! let state = service.store().state();
//! assert_eq!(state.post_list, vec![created]);
//! assert!(!state.loading());
//! ```

mod pending;

pub use pending::Pending;

use crate::domain::{GatewayError, NewPost, OperationError, Post, PostId};
use crate::gateway::{cancel, CancelSignal, GatewayFuture, PostGateway, RequestContext};
use crate::store::{BlogState, Event, Operation, Outcome, RequestId, Store};
use futures_util::FutureExt;
use pending::{abandon, Settled};
use tracing::Instrument;

impl Operation {
    /// Sorts a gateway failure into what the caller of this operation sees.
    ///
    /// Only updates recover from validation rejections; the edit form is the
    /// one place that can show field errors.
    #[must_use]
    pub fn classify(self, error: GatewayError) -> OperationError {
        match (self, error) {
            (Self::Update, GatewayError::Validation(errors)) => OperationError::Rejected(errors),
            (_, error) => OperationError::Fatal(error),
        }
    }
}

/// Orchestrates gateway calls against one store.
#[derive(Debug)]
pub struct PostService<G> {
    store: Store,
    gateway: G,
}

impl<G: PostGateway> PostService<G> {
    /// Binds `gateway` to `store`.
    pub const fn new(store: Store, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// The store this service dispatches into.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The gateway this service calls.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetches every post and replaces the collection with them.
    ///
    /// `Started` is dispatched before this returns; the returned handle
    /// settles the request when awaited, aborted or dropped.
    ///
    /// # Returns
    ///
    /// A [`Pending`] resolving to the listed posts, or to
    /// [`OperationError::Fatal`] on any gateway failure.
    ///
    /// # Example
    ///
    /// ```
    /// use futures::executor::block_on;
    /// use postboard::domain::NewPost;
    /// use postboard::gateway::MemoryGateway;
    /// use postboard::service::PostService;
    /// use postboard::store::Store;
    ///
    /// let seed = NewPost::new("Seeded", "", "2024-01-01T08:00").with_id("1");
    /// let service = PostService::new(Store::new(), MemoryGateway::with_posts(vec![seed]));
    ///
    /// let pending = service.list();
    /// assert!(service.store().state().loading());
    ///
    /// let posts = block_on(pending).unwrap();
    /// assert_eq!(service.store().state().post_list, posts);
    /// ```
    pub fn list(&self) -> Pending<Vec<Post>> {
        self.run(
            Operation::List,
            |gateway, ctx| gateway.list_all(ctx),
            |posts| Outcome::Listed(posts.clone()),
        )
    }

    /// Creates a post and appends it to the collection.
    ///
    /// # Parameters
    ///
    /// * `body` - Post fields without an id; the gateway assigns one
    ///
    /// # Returns
    ///
    /// A [`Pending`] resolving to the stored post. Validation failures are
    /// [`OperationError::Fatal`] here.
    pub fn create(&self, body: NewPost) -> Pending<Post> {
        self.run(
            Operation::Create,
            move |gateway, ctx| gateway.create(body, ctx),
            |post| Outcome::Created(post.clone()),
        )
    }

    /// Saves `body` as post `id` and replaces it in the collection.
    ///
    /// A successful save also ends the edit session.
    ///
    /// # Parameters
    ///
    /// * `id` - Post to overwrite
    /// * `body` - Full replacement, usually the edited copy of `editing_post`
    ///
    /// # Returns
    ///
    /// A [`Pending`] resolving to the stored post. A validation rejection
    /// resolves to [`OperationError::Rejected`] with the field errors to show
    /// next to the form; the collection and selection are left alone.
    pub fn update(&self, id: PostId, body: Post) -> Pending<Post> {
        self.run(
            Operation::Update,
            move |gateway, ctx| gateway.update(id, body, ctx),
            |post| Outcome::Updated(post.clone()),
        )
    }

    /// Deletes post `id` and removes it from the collection.
    ///
    /// # Parameters
    ///
    /// * `id` - Post to delete; cleared from `editing_post` if selected
    ///
    /// # Returns
    ///
    /// A [`Pending`] resolving to the gateway's acknowledgement, which the
    /// store ignores.
    pub fn delete(&self, id: PostId) -> Pending<Post> {
        let target = id.clone();
        self.run(
            Operation::Delete,
            move |gateway, ctx| gateway.delete(id, ctx),
            move |_| Outcome::Deleted(target),
        )
    }

    /// Opens post `id` for editing; selects nothing if it is unknown.
    pub fn start_editing(&self, id: PostId) -> BlogState {
        self.store.dispatch(Event::StartEditing(id))
    }

    /// Closes the current edit session.
    pub fn cancel_editing(&self) -> BlogState {
        self.store.dispatch(Event::CancelEditing)
    }

    fn run<T, C, S>(&self, operation: Operation, call: C, settle: S) -> Pending<T>
    where
        T: 'static,
        C: FnOnce(&G, RequestContext) -> GatewayFuture<T>,
        S: FnOnce(&T) -> Outcome + 'static,
    {
        let request_id = RequestId::generate();
        let span = tracing::debug_span!("operation", %operation, %request_id);

        self.store.dispatch(Event::Started {
            operation,
            request_id: request_id.clone(),
        });

        let (signal, registration) = CancelSignal::pair();
        let ctx = span.in_scope(|| RequestContext::new(request_id.clone(), operation, signal.clone()));
        let call = cancel::abortable(call(&self.gateway, ctx), registration);

        let settled = Settled::default();
        let store = self.store.clone();
        let task_settled = settled.clone();
        let task_request_id = request_id.clone();

        let future = async move {
            let result = match call.await {
                Ok(result) => result,
                Err(_aborted) => {
                    abandon(&store, &task_settled, operation, &task_request_id, "aborted");
                    return Err(OperationError::Fatal(GatewayError::Cancelled));
                }
            };

            if !task_settled.claim() {
                // Aborted after the gateway finished; the caller already saw it go.
                return Err(OperationError::Fatal(GatewayError::Cancelled));
            }

            match result {
                Ok(value) => {
                    tracing::debug!("operation succeeded");
                    store.dispatch(Event::Succeeded {
                        request_id: task_request_id,
                        outcome: settle(&value),
                    });
                    Ok(value)
                }
                Err(error) => {
                    let error = operation.classify(error);
                    match &error {
                        OperationError::Rejected(errors) => {
                            tracing::debug!(%errors, "operation rejected");
                        }
                        OperationError::Fatal(error) => {
                            tracing::warn!(%error, "operation failed");
                        }
                    }
                    store.dispatch(Event::Failed {
                        operation,
                        request_id: task_request_id,
                        reason: error.to_string(),
                    });
                    Err(error)
                }
            }
        }
        .instrument(span)
        .boxed_local();

        Pending::new(request_id, operation, signal, settled, self.store.clone(), future)
    }
}
