//! Operation gateway abstraction.
//!
//! The gateway performs the remote side of each operation. This crate does
//! not own a transport: callers plug in their own [`PostGateway`]
//! (HTTP client, IPC, test double) or use the bundled [`MemoryGateway`].
//!
//! Every method returns a `'static` boxed future so the orchestrator can
//! hold it across awaits without borrowing the gateway. Implementations
//! clone whatever handles they need into the future.
//!
//! # Modules
//!
//! - [`cancel`]: Cooperative cancellation signal
//! - [`context`]: Per-request context (request id, cancellation, tracing)
//! - [`memory`]: In-process gateway backed by a `Vec`

pub mod cancel;
pub mod context;
pub mod memory;

pub use cancel::CancelSignal;
pub use context::{RequestContext, TraceContext};
pub use memory::MemoryGateway;

use crate::domain::{GatewayError, NewPost, Post, PostId};
use futures_util::future::LocalBoxFuture;

/// Future returned by gateway calls.
pub type GatewayFuture<T> = LocalBoxFuture<'static, Result<T, GatewayError>>;

/// Remote create/read/update/delete of posts.
///
/// A validation rejection must be reported as
/// [`GatewayError::Validation`]; the orchestrator relies on that variant to
/// tell a recoverable rejection from a fatal failure.
pub trait PostGateway {
    /// Fetches every post, in the order the remote side keeps them.
    fn list_all(&self, ctx: RequestContext) -> GatewayFuture<Vec<Post>>;

    /// Creates a post and returns it with its assigned id.
    fn create(&self, body: NewPost, ctx: RequestContext) -> GatewayFuture<Post>;

    /// Replaces the post `id` with `body` and returns the stored version.
    fn update(&self, id: PostId, body: Post, ctx: RequestContext) -> GatewayFuture<Post>;

    /// Deletes the post `id`. The returned acknowledgement may be ignored.
    fn delete(&self, id: PostId, ctx: RequestContext) -> GatewayFuture<Post>;
}

impl<G: PostGateway + ?Sized> PostGateway for std::rc::Rc<G> {
    fn list_all(&self, ctx: RequestContext) -> GatewayFuture<Vec<Post>> {
        (**self).list_all(ctx)
    }

    fn create(&self, body: NewPost, ctx: RequestContext) -> GatewayFuture<Post> {
        (**self).create(body, ctx)
    }

    fn update(&self, id: PostId, body: Post, ctx: RequestContext) -> GatewayFuture<Post> {
        (**self).update(id, body, ctx)
    }

    fn delete(&self, id: PostId, ctx: RequestContext) -> GatewayFuture<Post> {
        (**self).delete(id, ctx)
    }
}
