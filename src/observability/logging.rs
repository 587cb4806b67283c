//! Structured logging.
//!
//! # Responsibilities
//! - Carry the registry's log sink (a plain `Fn(&str)` callback)
//! - Provide the default sink that forwards lines to `tracing`
//! - Initialize the `tracing` subscriber for the binaries
//!
//! # Design Decisions
//! - The registry never writes to stdout itself; all output goes through the sink
//! - `--no-log` means "no sink", not a filtered sink
//! - Log level for the binaries comes from `RUST_LOG`, defaulting to `hotcfg=info`

use std::fmt;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// A callback receiving one formatted log line per notable registry event.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink that forwards every line to `tracing` at info level.
pub fn tracing_sink() -> LogSink {
    Arc::new(|line: &str| tracing::info!(target: "hotcfg", "{}", line))
}

/// Handle used by registry components to emit log lines.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<LogSink>,
}

impl Logger {
    pub fn new(sink: Option<LogSink>) -> Self {
        Self { sink }
    }

    /// A logger that discards everything.
    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn log(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.sink {
            sink(&format!("[hotcfg] {args}"));
        }
    }

    /// Log a cell transition: `act` is one of `NEW`, `DEF`, `IGN`, `SET`.
    pub fn transition(&self, act: &str, name: &str, before: Option<&str>, after: &str) {
        match before {
            Some(before) if before == after => {
                self.log(format_args!("{act} {name:<30}: no change (current: {before})"))
            }
            Some(before) => self.log(format_args!("{act} {name:<30}: {before} -> {after}")),
            None => self.log(format_args!("{act} {name:<30}: {after}")),
        }
    }

    /// Log a fatal condition and hand the error back for propagation.
    pub fn fatal<E: fmt::Display>(&self, err: E) -> E {
        self.log(format_args!("FATAL {err}"));
        err
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

/// Initialize the global `tracing` subscriber.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotcfg=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn capture() -> (Logger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = lines.clone();
        let sink: LogSink = Arc::new(move |line: &str| sink_lines.lock().push(line.to_string()));
        (Logger::new(Some(sink)), lines)
    }

    #[test]
    fn test_transition_lines() {
        let (logger, lines) = capture();
        logger.transition("NEW", "http.port", None, "2009");
        logger.transition("SET", "http.port", Some("2009"), "2010");
        logger.transition("SET", "http.port", Some("2010"), "2010");

        let lines = lines.lock();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[hotcfg] NEW http.port"));
        assert!(lines[1].ends_with("2009 -> 2010"));
        assert!(lines[2].contains("no change"));
    }

    #[test]
    fn test_silent_logger_drops_lines() {
        let logger = Logger::silent();
        logger.log(format_args!("nothing to see"));
        assert_eq!(logger.fatal("boom"), "boom");
    }
}
