//! Logging and span export.
//!
//! ```text
//! tracing macros ─▶ EnvFilter ─┬─▶ fmt layer ─▶ stderr
//!                              └─▶ tracing-opentelemetry ─▶ OpenTelemetry SDK ─▶ FileSpanExporter ─▶ JSON lines
//! ```
//!
//! The OpenTelemetry branch is only installed when a trace file is
//! configured. Every dispatch and every orchestrated operation opens a span,
//! so an exported trace shows which request ids overlapped.
//!
//! # Configuration
//!
//! Filter directives come from, in order:
//! 1. `RUST_LOG`
//! 2. `trace_level` in the configuration
//! 3. Default: `"info"`

mod exporter;
mod init;

pub use init::init_tracing;
