//! File-based OpenTelemetry span export.
//!
//! Spans are written as JSON lines, one document per exported batch, to a
//! file chosen in the configuration. This keeps traces of operation
//! lifecycles available offline without running a collector.

use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Map, Value as JsonValue};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Span exporter appending JSON lines to a file.
#[derive(Debug)]
struct FileSpanExporter {
    path: PathBuf,
    /// Opened on first export so a bad path only fails exports.
    file: Option<File>,
    resource: Resource,
    is_shutdown: bool,
}

impl FileSpanExporter {
    const fn new(path: PathBuf, resource: Resource) -> Self {
        Self {
            path,
            file: None,
            resource,
            is_shutdown: false,
        }
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        if self.file.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            self.file = Some(file);
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn format_batch(&self, batch: &[SpanData]) -> JsonValue {
        let resource: Map<String, JsonValue> = self
            .resource
            .iter()
            .map(|(key, value)| (key.to_string(), JsonValue::String(value.to_string())))
            .collect();

        json!({
            "resource": resource,
            "spans": batch.iter().map(format_span).collect::<Vec<_>>(),
        })
    }
}

fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos()
        .to_string()
}

fn format_span(span: &SpanData) -> JsonValue {
    let attributes: Map<String, JsonValue> = span
        .attributes
        .iter()
        .map(|kv| (kv.key.to_string(), JsonValue::String(kv.value.to_string())))
        .collect();

    let parent_span_id = if span.parent_span_id == SpanId::INVALID {
        String::new()
    } else {
        format!("{:016x}", span.parent_span_id)
    };

    let status = match &span.status {
        Status::Unset => json!({ "code": "unset" }),
        Status::Ok => json!({ "code": "ok" }),
        Status::Error { description } => json!({ "code": "error", "message": description.to_string() }),
    };

    json!({
        "traceId": format!("{:032x}", span.span_context.trace_id()),
        "spanId": format!("{:016x}", span.span_context.span_id()),
        "parentSpanId": parent_span_id,
        "name": span.name,
        "startTimeUnixNano": unix_nanos(span.start_time),
        "endTimeUnixNano": unix_nanos(span.end_time),
        "attributes": attributes,
        "events": span.events.iter().map(|event| event.name.to_string()).collect::<Vec<_>>(),
        "status": status,
    })
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let line = self.format_batch(&batch).to_string();
        let result = self
            .write_line(&line)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
        self.file = None;
    }
}

/// Builds a tracer provider that exports every finished span to `path`.
///
/// Spans are exported synchronously as they end, one JSON document per
/// batch. The file is created on the first export.
///
/// # Parameters
///
/// * `path` - File receiving the JSON lines
/// * `resource` - Resource attributes (service name) attached to each batch
///
/// # Returns
///
/// A provider whose tracers feed the file exporter. Dropping the provider
/// shuts the exporter down.
pub fn create_tracer_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter::new(path, resource.clone());

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{Tracer, TracerProvider as _};
    use opentelemetry::KeyValue;

    #[test]
    fn finished_spans_are_written_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let resource = Resource::new(vec![KeyValue::new("service.name", "postboard-test")]);
        let provider = create_tracer_provider(path.clone(), resource);

        provider.tracer("test").in_span("posts/list", |_cx| {});
        drop(provider);

        let contents = std::fs::read_to_string(&path).unwrap();
        let line: JsonValue = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(line["resource"]["service.name"], "postboard-test");
        assert_eq!(line["spans"][0]["name"], "posts/list");
    }
}
