//! Command-line walkthrough of a postboard session.
//!
//! Runs a scripted editing session against the in-memory gateway and prints
//! every store snapshot as a JSON line on stdout:
//!
//! ```text
//! postboard [config.toml]
//! ```
//!
//! The session lists the posts, opens the first one for editing, submits an
//! invalid edit (rejected with field errors), submits a valid one, creates a
//! post, deletes it, and finally shows that an aborted list request releases
//! the loading state.

use futures::executor::block_on;
use postboard::domain::{NewPost, Post};
use postboard::gateway::MemoryGateway;
use postboard::{initialize, Config, PostService, PostboardError};
use std::process::ExitCode;

fn default_posts() -> Vec<Post> {
    vec![
        NewPost {
            title: "Getting started".to_string(),
            description: "Setting up the project and its tooling.".to_string(),
            publish_date: "2024-01-10T09:00".to_string(),
            featured_image: String::new(),
            published: true,
        }
        .with_id("seed-1"),
        NewPost::new("Second thoughts", "A draft that never got finished.", "2024-02-01T18:30")
            .with_id("seed-2"),
    ]
}

fn load_config() -> postboard::Result<Config> {
    match std::env::args_os().nth(1) {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = match &config.seed_file {
        Some(path) => MemoryGateway::from_seed_file(path)?,
        None => MemoryGateway::with_posts(default_posts()),
    };

    let store = initialize(config);
    store.subscribe(|state| match serde_json::to_string(state) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize snapshot"),
    });

    let service = PostService::new(store, gateway);

    let posts = block_on(service.list())?;
    let Some(first) = posts.first().cloned() else {
        tracing::info!("no posts to edit");
        return Ok(());
    };

    service.start_editing(first.id.clone());

    let mut invalid = first.clone();
    invalid.title.clear();
    match block_on(service.update(first.id.clone(), invalid)) {
        Err(err) => match err.field_errors() {
            Some(errors) => tracing::info!(%errors, "edit rejected"),
            None => return Err(err.into()),
        },
        Ok(_) => tracing::warn!("invalid edit was accepted"),
    }

    let mut edited = first;
    edited.title = format!("{} (revised)", edited.title);
    edited.published = true;
    block_on(service.update(edited.id.clone(), edited))?;

    let created = block_on(service.create(NewPost::new(
        "Fresh post",
        "Created from the command line.",
        "2024-06-01T12:00",
    )))?;
    block_on(service.delete(created.id))?;

    let abandoned = service.list();
    abandoned.abort();
    if let Err(err) = block_on(abandoned) {
        tracing::info!(cancelled = err.is_cancelled(), "list request abandoned");
    }

    tracing::info!(
        remote_posts = service.gateway().posts().len(),
        loading = service.store().state().loading(),
        "session finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(PostboardError::Io(e)) => {
            eprintln!("postboard: cannot read config: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("postboard: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            eprintln!("postboard: {e}");
            ExitCode::FAILURE
        }
    }
}
