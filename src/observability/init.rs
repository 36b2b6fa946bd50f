//! Tracing initialization and subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service name attached to exported spans.
const SERVICE_NAME: &str = "postboard";

/// Resolves the filter directive: `RUST_LOG`, then config, then `"info"`.
fn filter_directive(config: &Config) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| config.trace_level.clone())
        .unwrap_or_else(|| "info".to_string())
}

/// Installs the global tracing subscriber.
///
/// Sets up a subscriber pipeline that:
/// 1. Filters events and spans with an `EnvFilter`
/// 2. Logs human-readable lines to stderr
/// 3. Exports spans through OpenTelemetry when `config.trace_file` is set
///
/// # Parameters
///
/// * `config` - Configuration carrying `trace_level` and `trace_file`
///
/// # Trace Level Resolution
///
/// 1. `RUST_LOG` if set and non-empty
/// 2. `config.trace_level` if set
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// - Creates the trace file's directory if it doesn't exist
/// - Idempotent: only the first call in a process installs a subscriber
///
/// # Example
///
/// ```rust
/// use postboard::observability::init_tracing;
/// use postboard::Config;
///
/// let config = Config {
///     trace_level: Some("postboard=debug".to_string()),
///     ..Config::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing ready");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::new(filter_directive(config));

    let otel_layer = config.trace_file.as_ref().map(|path| {
        if let Some(parent) = path.parent() {
            // Exports fail individually if the directory is still missing.
            let _ = std::fs::create_dir_all(parent);
        }
        let resource = Resource::new(vec![opentelemetry::KeyValue::new(
            "service.name",
            SERVICE_NAME,
        )]);
        let provider = exporter::create_tracer_provider(path.clone(), resource);
        OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME))
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
}
