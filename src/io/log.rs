/// Receives plain-text progress messages from the exporter.
///
/// This is the caller-facing progress channel (a status line, a UI log panel).
/// Internal diagnostics go through `tracing` instead.
pub trait LogSink {
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str),
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Forwards progress messages to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _message: &str) {}
}
