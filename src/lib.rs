pub mod config;
pub mod error;
pub mod flush;
pub mod queue;
pub mod signals;
pub mod sink;
pub mod uploader;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging (console only)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter))
        .init();
}

/// Initialize tracing with the queue sink next to the console output
///
/// The console keeps its `RUST_LOG` filter; the sink has its own filter so
/// the minimum buffered severity is independent of what the console shows.
///
/// Note: This function can only be called once, and must be called from
/// within a tokio runtime (the sink's appender task is spawned here).
pub fn init_tracing_with_sink(
    sink: sink::LogSink,
    min_level: tracing::Level,
    offset: chrono::FixedOffset,
) -> sink::SinkWriter {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = sink::SinkWriter::spawn(sink);
    let queue_layer = sink::QueueLayer::new(writer.clone(), offset)
        .with_filter(sink::QueueLayer::filter(min_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter))
        .with(queue_layer)
        .init();

    writer
}
