//! Post domain model.
//!
//! This module defines the [`Post`] entity held by the store, the [`NewPost`]
//! body sent when creating one, and the [`PostId`] identifier assigned by the
//! remote side. Field names serialize in camelCase to match the remote API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a post.
///
/// Opaque to the client: ids are only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wraps an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A blog post as known to the client.
///
/// Posts are plain values. The store never edits a post in place: an update
/// replaces the whole value with the one returned by the gateway.
///
/// # Examples
///
/// ```
/// use postboard::domain::{NewPost, Post};
///
/// let draft = NewPost::new("Hello", "First post", "2024-01-01T09:00");
/// let post = draft.with_id("1");
/// assert_eq!(post.id.as_str(), "1");
/// assert_eq!(post.title, "Hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub published: bool,
}

impl Post {
    /// Returns the body of this post without its identifier.
    #[must_use]
    pub fn to_new_post(&self) -> NewPost {
        NewPost {
            title: self.title.clone(),
            description: self.description.clone(),
            publish_date: self.publish_date.clone(),
            featured_image: self.featured_image.clone(),
            published: self.published,
        }
    }
}

/// Body of a post that has not been assigned an identifier yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub published: bool,
}

impl NewPost {
    /// Creates an unpublished draft with no featured image.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        publish_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            publish_date: publish_date.into(),
            ..Self::default()
        }
    }

    /// Attaches an identifier, producing a full [`Post`].
    #[must_use]
    pub fn with_id(self, id: impl Into<PostId>) -> Post {
        Post {
            id: id.into(),
            title: self.title,
            description: self.description,
            publish_date: self.publish_date,
            featured_image: self.featured_image,
            published: self.published,
        }
    }
}
