//! Domain layer for postboard.
//!
//! Plain data types shared by every other layer, independent of how
//! operations reach the remote side.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`post`]: Post entity and identifiers

pub mod error;
pub mod post;

pub use error::{FieldErrors, GatewayError, OperationError, PostboardError, Result};
pub use post::{NewPost, Post, PostId};
