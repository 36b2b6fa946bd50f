//! Lifecycle tests for `PostService` against a gateway whose replies are
//! released by hand, so completion order can be chosen per test.

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::FutureExt;
use postboard::domain::{FieldErrors, GatewayError, NewPost, OperationError, Post, PostId};
use postboard::gateway::{GatewayFuture, MemoryGateway, PostGateway, RequestContext};
use postboard::store::{BlogState, FailurePolicy, Operation, RequestId, Store};
use postboard::PostService;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

enum Reply {
    Posts(Vec<Post>),
    Post(Post),
}

type ReplySender = oneshot::Sender<Result<Reply, GatewayError>>;

/// Gateway that parks every call until the test answers it.
#[derive(Default)]
struct ScriptedGateway {
    calls: RefCell<VecDeque<(RequestContext, ReplySender)>>,
}

impl ScriptedGateway {
    fn park(&self, ctx: RequestContext) -> oneshot::Receiver<Result<Reply, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.calls.borrow_mut().push_back((ctx, tx));
        rx
    }

    /// Takes the oldest unanswered call.
    fn next_call(&self) -> (RequestContext, ReplySender) {
        self.calls
            .borrow_mut()
            .pop_front()
            .expect("no gateway call is waiting")
    }

    fn answer(&self, reply: Result<Reply, GatewayError>) -> RequestContext {
        let (ctx, tx) = self.next_call();
        let _ = tx.send(reply);
        ctx
    }
}

async fn await_reply(
    rx: oneshot::Receiver<Result<Reply, GatewayError>>,
) -> Result<Reply, GatewayError> {
    rx.await
        .map_err(|_| GatewayError::Transport("reply channel closed".to_string()))?
}

fn expect_posts(reply: Reply) -> Result<Vec<Post>, GatewayError> {
    match reply {
        Reply::Posts(posts) => Ok(posts),
        Reply::Post(_) => Err(GatewayError::Decode("expected a list".to_string())),
    }
}

fn expect_post(reply: Reply) -> Result<Post, GatewayError> {
    match reply {
        Reply::Post(post) => Ok(post),
        Reply::Posts(_) => Err(GatewayError::Decode("expected a single post".to_string())),
    }
}

impl PostGateway for ScriptedGateway {
    fn list_all(&self, ctx: RequestContext) -> GatewayFuture<Vec<Post>> {
        let rx = self.park(ctx);
        async move { expect_posts(await_reply(rx).await?) }.boxed_local()
    }

    fn create(&self, _body: NewPost, ctx: RequestContext) -> GatewayFuture<Post> {
        let rx = self.park(ctx);
        async move { expect_post(await_reply(rx).await?) }.boxed_local()
    }

    fn update(&self, _id: PostId, _body: Post, ctx: RequestContext) -> GatewayFuture<Post> {
        let rx = self.park(ctx);
        async move { expect_post(await_reply(rx).await?) }.boxed_local()
    }

    fn delete(&self, _id: PostId, ctx: RequestContext) -> GatewayFuture<Post> {
        let rx = self.park(ctx);
        async move { expect_post(await_reply(rx).await?) }.boxed_local()
    }
}

fn post(id: &str, title: &str) -> Post {
    NewPost::new(title, "", "2024-01-01T00:00").with_id(id)
}

fn scripted(posts: Vec<Post>) -> PostService<Rc<ScriptedGateway>> {
    PostService::new(Store::with_posts(posts), Rc::new(ScriptedGateway::default()))
}

fn ids(state: &BlogState) -> Vec<String> {
    state.post_list.iter().map(|post| post.id.to_string()).collect()
}

#[test]
fn started_is_dispatched_when_the_operation_is_issued() {
    let service = scripted(vec![]);

    let pending = service.list();

    let state = service.store().state();
    assert!(state.loading());
    assert_eq!(state.current_request_id(), Some(pending.request_id()));

    let ctx = service.gateway().answer(Ok(Reply::Posts(vec![post("1", "A")])));
    assert_eq!(&ctx.request_id, pending.request_id());
    assert_eq!(ctx.operation, Operation::List);

    assert_eq!(block_on(pending).unwrap().len(), 1);
    let state = service.store().state();
    assert!(!state.loading());
    assert_eq!(state.current_request_id(), None);
    assert_eq!(ids(&state), ["1"]);
}

#[test]
fn stale_completion_does_not_clear_a_newer_loading_state() {
    let service = scripted(vec![post("1", "A")]);

    let create = service.create(NewPost::new("B", "", "2024-01-01T00:00"));
    let delete = service.delete(PostId::from("1"));
    assert_eq!(service.store().state().current_request_id(), Some(delete.request_id()));

    service.gateway().answer(Ok(Reply::Post(post("2", "B"))));
    block_on(create).unwrap();

    let state = service.store().state();
    assert_eq!(ids(&state), ["1", "2"]);
    assert!(state.loading());
    assert_eq!(state.current_request_id(), Some(delete.request_id()));

    service.gateway().answer(Ok(Reply::Post(post("1", "A"))));
    block_on(delete).unwrap();

    let state = service.store().state();
    assert_eq!(ids(&state), ["2"]);
    assert!(!state.loading());
}

#[test]
fn completions_may_arrive_out_of_issue_order() {
    let service = scripted(vec![]);

    let first = service.list();
    let second = service.create(NewPost::new("B", "", "2024-01-01T00:00"));
    let (first_call, first_tx) = service.gateway().next_call();
    service.gateway().answer(Ok(Reply::Post(post("2", "B"))));

    // The newer operation settles first and releases loading.
    block_on(second).unwrap();
    assert!(!service.store().state().loading());

    // The older one lands its data without touching the tracker.
    assert_eq!(&first_call.request_id, first.request_id());
    let _ = first_tx.send(Ok(Reply::Posts(vec![post("1", "A"), post("2", "B")])));
    block_on(first).unwrap();

    let state = service.store().state();
    assert_eq!(ids(&state), ["1", "2"]);
    assert!(!state.loading());
    assert_eq!(state.current_request_id(), None);
}

#[test]
fn update_validation_failure_is_surfaced_as_rejection() {
    let service = scripted(vec![post("1", "A")]);
    service.start_editing(PostId::from("1"));

    let pending = service.update(PostId::from("1"), post("1", ""));
    let mut errors = FieldErrors::new();
    errors.insert("title", "Title is required");
    service
        .gateway()
        .answer(Err(GatewayError::Validation(errors.clone())));

    let err = block_on(pending).unwrap_err();
    assert_eq!(err, OperationError::Rejected(errors));

    let state = service.store().state();
    assert!(!state.loading());
    assert_eq!(state.current_request_id(), None);
    // The edit session stays open so the form can show the errors.
    assert_eq!(state.editing_post, Some(post("1", "A")));
    assert_eq!(state.post_list, vec![post("1", "A")]);
}

#[test]
fn validation_failure_of_create_is_fatal() {
    let service = scripted(vec![]);

    let pending = service.create(NewPost::default());
    service
        .gateway()
        .answer(Err(GatewayError::Validation(FieldErrors::new())));

    let err = block_on(pending).unwrap_err();
    assert!(matches!(err, OperationError::Fatal(GatewayError::Validation(_))));
    assert!(!service.store().state().loading());
}

#[test]
fn transport_failure_is_fatal_and_releases_loading() {
    let service = scripted(vec![post("1", "A")]);

    let pending = service.delete(PostId::from("1"));
    service
        .gateway()
        .answer(Err(GatewayError::Transport("connection refused".to_string())));

    let err = block_on(pending).unwrap_err();
    assert_eq!(
        err,
        OperationError::Fatal(GatewayError::Transport("connection refused".to_string()))
    );

    let state = service.store().state();
    assert!(!state.loading());
    assert_eq!(ids(&state), ["1"]);
}

#[test]
fn retained_failure_id_is_kept_until_the_next_start() {
    let store = Store::with_state(
        BlogState::with_posts(vec![post("1", "A")]).with_failure_policy(FailurePolicy::RetainRequestId),
    );
    let service = PostService::new(store, Rc::new(ScriptedGateway::default()));

    let pending = service.delete(PostId::from("1"));
    let request_id: RequestId = pending.request_id().clone();
    service
        .gateway()
        .answer(Err(GatewayError::not_found("post 1 not found")));
    block_on(pending).unwrap_err();

    let state = service.store().state();
    assert!(!state.loading());
    assert_eq!(state.current_request_id(), Some(&request_id));
}

#[test]
fn aborting_releases_loading_immediately() {
    let service = scripted(vec![post("1", "A")]);

    let pending = service.update(PostId::from("1"), post("1", "B"));
    let (ctx, tx) = service.gateway().next_call();

    pending.abort();
    assert!(ctx.is_cancelled());
    assert!(pending.is_settled());
    assert!(!service.store().state().loading());

    // A reply arriving after the abort is ignored.
    let _ = tx.send(Ok(Reply::Post(post("1", "B"))));
    let err = block_on(pending).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(service.store().state().post_list, vec![post("1", "A")]);
}

#[test]
fn aborting_a_superseded_operation_keeps_the_newer_one_tracked() {
    let service = scripted(vec![]);

    let older = service.list();
    let newer = service.list();
    older.abort();

    let state = service.store().state();
    assert!(state.loading());
    assert_eq!(state.current_request_id(), Some(newer.request_id()));

    drop(older);
    service.gateway().next_call();
    service.gateway().answer(Ok(Reply::Posts(vec![])));
    block_on(newer).unwrap();
    assert!(!service.store().state().loading());
}

#[test]
fn dropping_an_unsettled_operation_releases_loading() {
    let service = scripted(vec![]);

    let pending = service.list();
    let (ctx, _tx) = service.gateway().next_call();
    assert!(service.store().state().loading());

    drop(pending);

    assert!(ctx.is_cancelled());
    assert!(!service.store().state().loading());
}

#[test]
fn dropping_a_settled_operation_dispatches_nothing() {
    let service = scripted(vec![]);
    let snapshots = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&snapshots);
    service.store().subscribe(move |_| *counter.borrow_mut() += 1);

    let pending = service.list();
    service.gateway().answer(Ok(Reply::Posts(vec![])));
    let outcome = block_on(pending);

    assert!(outcome.is_ok());
    // Started and Succeeded, nothing from the drop inside block_on.
    assert_eq!(*snapshots.borrow(), 2);
}

#[test]
fn memory_gateway_round_trip_keeps_store_and_remote_in_step() {
    let gateway = MemoryGateway::with_posts(vec![post("1", "A"), post("2", "B")]);
    let service = PostService::new(Store::new(), gateway.clone());

    block_on(service.list()).unwrap();
    assert_eq!(ids(&service.store().state()), ["1", "2"]);

    service.start_editing(PostId::from("2"));
    let mut edited = post("2", "B2");
    edited.published = true;
    block_on(service.update(PostId::from("2"), edited.clone())).unwrap();

    let created = block_on(service.create(NewPost::new("C", "", "2024-03-03T03:03"))).unwrap();
    block_on(service.delete(PostId::from("1"))).unwrap();

    let state = service.store().state();
    assert_eq!(state.post_list, gateway.posts());
    assert_eq!(state.post_list, vec![edited, created]);
    assert!(state.editing_post.is_none());
    assert!(!state.loading());
}

#[test]
fn rejected_update_from_memory_gateway_leaves_store_untouched() {
    let gateway = MemoryGateway::with_posts(vec![post("1", "A")]);
    let service = PostService::new(Store::with_posts(gateway.posts()), gateway);
    service.start_editing(PostId::from("1"));

    let mut bad = post("1", "A");
    bad.publish_date = "not a date".to_string();
    let err = block_on(service.update(PostId::from("1"), bad)).unwrap_err();

    assert!(err.field_errors().and_then(|e| e.get("publishDate")).is_some());
    let state = service.store().state();
    assert_eq!(state.post_list, vec![post("1", "A")]);
    assert!(state.editing_post.is_some());
    assert!(!state.loading());
}

#[test]
fn editing_helpers_dispatch_synchronously() {
    let service = scripted(vec![post("1", "A")]);

    let state = service.start_editing(PostId::from("1"));
    assert_eq!(state.editing_post, Some(post("1", "A")));

    let state = service.start_editing(PostId::from("missing"));
    assert!(state.editing_post.is_none());

    service.start_editing(PostId::from("1"));
    let state = service.cancel_editing();
    assert!(state.editing_post.is_none());
    assert!(!state.loading());
}
