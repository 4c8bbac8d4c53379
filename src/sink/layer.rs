//! Tracing layer that buffers events in the durable queue

use super::{entry::LogEntry, SinkWriter};
use chrono::{FixedOffset, Utc};
use std::fmt::Write as _;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

/// Targets that must never reach the queue: the store and HTTP stacks log
/// while serving the sink itself.
const EXCLUDED_TARGETS: &[&str] = &["sqlx", "hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Custom tracing layer that turns each event into one queued [`LogEntry`]
pub struct QueueLayer {
    writer: SinkWriter,
    offset: FixedOffset,
}

impl QueueLayer {
    pub fn new(writer: SinkWriter, offset: FixedOffset) -> Self {
        Self { writer, offset }
    }

    /// Per-layer filter: `min_level` and above, minus the excluded targets
    pub fn filter(min_level: Level) -> Targets {
        EXCLUDED_TARGETS.iter().fold(
            Targets::new().with_default(LevelFilter::from_level(min_level)),
            |targets, target| targets.with_target(*target, LevelFilter::OFF),
        )
    }
}

impl<S> Layer<S> for QueueLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level().as_str();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry::format(&Utc::now(), self.offset, level, &visitor.into_message());
        self.writer.write(entry);
    }
}

/// Visitor to extract the message and the remaining fields from an event
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl FieldVisitor {
    fn into_message(self) -> String {
        let mut message = self.message.unwrap_or_default();

        for (name, value) in self.fields {
            if !message.is_empty() {
                message.push(' ');
            }
            let _ = write!(message, "{}={}", name, value);
        }

        message
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{:?}", value);
        match field.name() {
            "message" => self.message = Some(value),
            name => self.fields.push((name, value)),
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            name => self.fields.push((name, value.to_string())),
        }
    }
}
