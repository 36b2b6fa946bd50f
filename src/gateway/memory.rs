//! In-process gateway.
//!
//! [`MemoryGateway`] behaves like the small REST backend the store is meant
//! to front: it assigns ids on create, validates bodies, answers unknown ids
//! with a 404-style status, and can be seeded from a json-server style
//! database file (`{ "posts": [...] }`).
//!
//! Work happens when the returned future is first polled, so an operation
//! aborted before that point never touches the data.

use super::{GatewayFuture, PostGateway, RequestContext};
use crate::domain::error::{FieldErrors, GatewayError, Result};
use crate::domain::{NewPost, Post, PostId};
use chrono::NaiveDateTime;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use uuid::Uuid;

/// Date-time layouts accepted for `publishDate`.
const PUBLISH_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// On-disk seed format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SeedData {
    #[serde(default)]
    posts: Vec<Post>,
}

/// Gateway keeping posts in memory.
///
/// Clones share the same data, which lets a test or demo inspect what the
/// "remote" side holds after the store has been updated.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    posts: Rc<RefCell<Vec<Post>>>,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway holding `posts`.
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Rc::new(RefCell::new(posts)),
        }
    }

    /// Loads a gateway from a json-server style database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let _span = tracing::debug_span!("memory_gateway_load", path = %path.as_ref().display())
            .entered();

        let contents = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&contents)?;

        tracing::debug!(count = seed.posts.len(), "seed posts loaded");
        Ok(Self::with_posts(seed.posts))
    }

    /// Returns a copy of the posts currently held.
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.posts.borrow().clone()
    }

    /// Checks a post body the way the backend would.
    ///
    /// # Errors
    ///
    /// Returns the offending fields with a message each.
    pub fn validate(body: &NewPost) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if body.title.trim().is_empty() {
            errors.insert("title", "Title is required");
        }

        let date_ok = PUBLISH_DATE_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(&body.publish_date, format).is_ok());
        if !date_ok {
            errors.insert("publishDate", "Publish date must be a date-time like 2024-01-31T09:30");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_cancelled(ctx: &RequestContext) -> std::result::Result<(), GatewayError> {
    if ctx.is_cancelled() {
        tracing::debug!(request_id = %ctx.request_id, "request cancelled before it ran");
        return Err(GatewayError::Cancelled);
    }
    Ok(())
}

impl PostGateway for MemoryGateway {
    fn list_all(&self, ctx: RequestContext) -> GatewayFuture<Vec<Post>> {
        let posts = Rc::clone(&self.posts);
        async move {
            check_cancelled(&ctx)?;
            let posts = posts.borrow().clone();
            tracing::debug!(count = posts.len(), "listed posts");
            Ok(posts)
        }
        .boxed_local()
    }

    fn create(&self, body: NewPost, ctx: RequestContext) -> GatewayFuture<Post> {
        let posts = Rc::clone(&self.posts);
        async move {
            check_cancelled(&ctx)?;
            Self::validate(&body).map_err(GatewayError::Validation)?;

            let post = body.with_id(Uuid::new_v4().to_string());
            posts.borrow_mut().push(post.clone());

            tracing::debug!(post_id = %post.id, "post created");
            Ok(post)
        }
        .boxed_local()
    }

    fn update(&self, id: PostId, body: Post, ctx: RequestContext) -> GatewayFuture<Post> {
        let posts = Rc::clone(&self.posts);
        async move {
            check_cancelled(&ctx)?;
            Self::validate(&body.to_new_post()).map_err(GatewayError::Validation)?;

            let mut posts = posts.borrow_mut();
            let slot = posts
                .iter_mut()
                .find(|post| post.id == id)
                .ok_or_else(|| GatewayError::not_found(format!("post {id} not found")))?;

            // The path id wins over whatever id the body carries.
            *slot = body.to_new_post().with_id(id);

            tracing::debug!(post_id = %slot.id, "post updated");
            Ok(slot.clone())
        }
        .boxed_local()
    }

    fn delete(&self, id: PostId, ctx: RequestContext) -> GatewayFuture<Post> {
        let posts = Rc::clone(&self.posts);
        async move {
            check_cancelled(&ctx)?;

            let mut posts = posts.borrow_mut();
            let index = posts
                .iter()
                .position(|post| post.id == id)
                .ok_or_else(|| GatewayError::not_found(format!("post {id} not found")))?;

            let removed = posts.remove(index);
            tracing::debug!(post_id = %removed.id, "post deleted");
            Ok(removed)
        }
        .boxed_local()
    }
}
