//! Collection store and request tracking.
//!
//! The store layer holds the post collection, the editing selection and the
//! loading state, and changes them only through the pure [`reduce`]
//! function:
//!
//! ```text
//! Event ─▶ reduce(previous, event) ─▶ next snapshot ─▶ listeners
//!             │
//!             ├─ collection transitions (Succeeded outcome, editing)
//!             └─ RequestTracker (Started / Succeeded / Failed)
//! ```
//!
//! # Modules
//!
//! - [`events`]: Event, operation, outcome and request id types
//! - [`handle`]: The shared [`Store`] instance with dispatch and listeners
//! - [`reducer`]: Pure transition functions
//! - [`state`]: The [`BlogState`] snapshot
//! - [`tracker`]: Single in-flight request tracking

pub mod events;
pub mod handle;
pub mod reducer;
pub mod state;
pub mod tracker;

pub use events::{Event, Operation, Outcome, Phase, RequestId};
pub use handle::{Store, SubscriptionId};
pub use reducer::{apply_outcome, reduce};
pub use state::BlogState;
pub use tracker::{FailurePolicy, RequestTracker};
