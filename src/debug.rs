//! Debug/telemetry output.
//!
//! Messages go to a pluggable [`DebugSink`]. The client only builds an
//! active [`Debugger`] when [`ClientOptions::debug`](crate::ClientOptions)
//! is set; otherwise every `emit` is a no-op.

use std::{fmt, io::Write, sync::Arc};

/// Severity attached to a debug message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of leveled debug messages.
pub trait DebugSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

/// Writes `[LEVEL] message` lines to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl DebugSink for StdoutSink {
    fn emit(&self, level: Level, message: &str) {
        let mut out = std::io::stdout().lock();
        // Losing a debug line is not worth failing a request over.
        let _ = writeln!(out, "[{level}] {message}");
    }
}

/// Routes messages into `tracing` under the `scraperapi_http` target.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl DebugSink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Debug => tracing::debug!(target: "scraperapi_http", "{message}"),
            Level::Info => tracing::info!(target: "scraperapi_http", "{message}"),
            Level::Warn => tracing::warn!(target: "scraperapi_http", "{message}"),
            Level::Error => tracing::error!(target: "scraperapi_http", "{message}"),
        }
    }
}

/// Handle to the configured sink, or nothing when debugging is off.
#[derive(Clone, Default)]
pub(crate) struct Debugger {
    sink: Option<Arc<dyn DebugSink>>,
}

impl Debugger {
    pub(crate) fn new(sink: Option<Arc<dyn DebugSink>>) -> Self {
        Self { sink }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub(crate) fn emit(&self, level: Level, message: impl AsRef<str>) {
        if let Some(sink) = &self.sink {
            sink.emit(level, message.as_ref());
        }
    }
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
