//! Postboard: a client-side state container for remotely managed blog posts.
//!
//! Postboard keeps an ordered collection of posts in memory, merges the
//! results of asynchronous create/list/update/delete operations into it, and
//! tracks a single in-flight request so a loading indicator and an editing
//! selection stay consistent while operations race.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Orchestrator (service/)                            │  ← list/create/update/delete
//! └─────────────────────────────────────────────────────┘
//!          │ Started / Succeeded / Failed     │ gateway calls
//!          ▼                                  ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  Store (store/)          │   │  Gateway (gateway/)      │
//! │  reduce + RequestTracker │   │  PostGateway trait       │
//! └──────────────────────────┘   └──────────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/)                                   │  ← Post, errors
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Layers
//!
//! - [`domain`]: Post entity, identifiers and error types
//! - [`store`]: State snapshot, events, pure transitions, request tracking
//! - [`gateway`]: Remote operation abstraction, cancellation, in-memory backend
//! - [`service`]: Lifecycle orchestration around gateway calls
//! - [`observability`]: Tracing subscriber and span export
//!
//! # Concurrency
//!
//! Everything runs on one thread. The store is `!Send`, every dispatch runs
//! to completion before the next, and operations only suspend while waiting
//! on their gateway future. Several operations may be in flight at once;
//! the request tracker's identity check keeps a late completion from
//! clearing a loading state a newer operation owns.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use postboard::domain::{NewPost, PostId};
//! use postboard::gateway::MemoryGateway;
//! use postboard::service::PostService;
//! use postboard::{initialize, Config};
//!
//! let store = initialize(&Config::default());
//! let service = PostService::new(store, MemoryGateway::new());
//!
//! let post = block_on(service.create(NewPost::new("Draft", "", "2024-05-01T10:00")))?;
//! service.start_editing(post.id.clone());
//!
//! let mut edited = post.clone();
//! edited.title = "Final".to_string();
//! block_on(service.update(post.id.clone(), edited))?;
//!
//! let state = service.store().state();
//! assert_eq!(state.post_list[0].title, "Final");
//! assert!(state.editing_post.is_none());
//! assert!(!state.loading());
//! # Ok::<(), postboard::domain::OperationError>(())
//! ```

pub mod domain;
pub mod gateway;
pub mod observability;
pub mod service;
pub mod store;

pub use domain::{PostboardError, Result};
pub use service::{Pending, PostService};
pub use store::{BlogState, Event, FailurePolicy, Store};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration.
///
/// Loaded from a TOML file; every key is optional.
///
/// ```toml
/// trace_level = "postboard=debug"
/// trace_file = "/tmp/postboard-otlp.json"
/// failure_policy = "retain-request-id"
/// seed_file = "db.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tracing filter directive. Default: `"info"`, overridden by `RUST_LOG`.
    pub trace_level: Option<String>,

    /// File receiving exported spans. No span export when unset.
    pub trace_file: Option<PathBuf>,

    /// What a matching failure does to the tracked request id.
    pub failure_policy: FailurePolicy,

    /// json-server style database used to seed the in-memory gateway.
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PostboardError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| PostboardError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// Relative `trace_file` and `seed_file` paths are resolved against the
    /// directory containing the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;

        if let Some(base) = path.parent() {
            config.trace_file = config.trace_file.map(|file| base.join(file));
            config.seed_file = config.seed_file.map(|file| base.join(file));
        }
        Ok(config)
    }
}

/// Installs tracing and creates an empty store configured by `config`.
///
/// Each call returns an independent store; there is no global instance.
pub fn initialize(config: &Config) -> Store {
    observability::init_tracing(config);
    tracing::debug!(failure_policy = ?config.failure_policy, "initializing postboard store");

    Store::with_state(BlogState::new().with_failure_policy(config.failure_policy))
}
