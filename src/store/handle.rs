//! Store instance.
//!
//! [`Store`] owns the current [`BlogState`] and is the only place where it
//! changes. Handles are cheap to clone and all clones share one state.
//! The store is single-threaded by construction (`!Send`): every dispatch
//! runs to completion before the next one starts, which is the whole
//! concurrency discipline of the crate.

use super::events::Event;
use super::reducer::reduce;
use super::state::BlogState;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies a listener registered with [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&BlogState)>;

struct Inner {
    state: RefCell<BlogState>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
    /// Set while listeners are being called.
    notifying: Cell<bool>,
    /// A dispatch happened during notification; listeners still owe a look.
    dirty: Cell<bool>,
}

/// Clears the notifying flag even if a listener panics.
struct NotifyGuard<'a>(&'a Inner);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.notifying.set(false);
        self.0.dirty.set(false);
    }
}

/// Shared handle to one store instance.
///
/// # Examples
///
/// ```
/// use postboard::domain::{NewPost, PostId};
/// use postboard::store::{Event, Store};
///
/// let post = NewPost::new("Hello", "", "2024-01-01T00:00").with_id("1");
/// let store = Store::with_posts(vec![post.clone()]);
///
/// let state = store.dispatch(Event::StartEditing(PostId::from("1")));
/// assert_eq!(state.editing_post, Some(post));
///
/// let state = store.dispatch(Event::CancelEditing);
/// assert!(state.editing_post.is_none());
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    /// Creates a store with an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(BlogState::new())
    }

    /// Creates a store seeded with `posts`.
    #[must_use]
    pub fn with_posts(posts: Vec<crate::domain::Post>) -> Self {
        Self::with_state(BlogState::with_posts(posts))
    }

    /// Creates a store starting from an arbitrary state.
    #[must_use]
    pub fn with_state(state: BlogState) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                notifying: Cell::new(false),
                dirty: Cell::new(false),
            }),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> BlogState {
        self.inner.state.borrow().clone()
    }

    /// Feeds `event` through the transition function and returns the new
    /// snapshot.
    ///
    /// Listeners are notified after the state has been replaced. A listener
    /// may dispatch in turn: the nested event is reduced at once, and once
    /// the current round of listeners has finished they are called again
    /// with the latest state. The last snapshot every listener receives is
    /// therefore always the store's current state.
    ///
    /// # Parameters
    ///
    /// * `event` - Lifecycle or editing event to apply
    ///
    /// # Returns
    ///
    /// The state produced by this event, before any nested dispatch made by
    /// a listener.
    ///
    /// # Example
    ///
    /// ```
    /// use postboard::store::{Event, Operation, RequestId, Store};
    ///
    /// let store = Store::new();
    /// let state = store.dispatch(Event::Started {
    ///     operation: Operation::List,
    ///     request_id: RequestId::from("r1"),
    /// });
    /// assert!(state.loading());
    /// ```
    pub fn dispatch(&self, event: Event) -> BlogState {
        let _span = tracing::debug_span!("dispatch", event = event.name()).entered();
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            let previous = std::mem::take(&mut *state);
            *state = reduce(previous, &event);
            state.clone()
        };

        tracing::trace!(
            event = event.name(),
            posts = snapshot.post_list.len(),
            loading = snapshot.loading(),
            "event dispatched"
        );

        if self.inner.notifying.get() {
            self.inner.dirty.set(true);
            return snapshot;
        }

        self.inner.notifying.set(true);
        let _guard = NotifyGuard(&self.inner);
        self.notify(&snapshot);
        while self.inner.dirty.replace(false) {
            let latest = self.state();
            self.notify(&latest);
        }
        snapshot
    }

    /// Registers `listener` to receive every snapshot produced by
    /// [`dispatch`](Self::dispatch).
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&BlogState) + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    fn notify(&self, snapshot: &BlogState) {
        // Listeners may dispatch or subscribe, so call them on a copy.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
