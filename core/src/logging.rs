//! Logging sink used by `NetworkClient`.
//!
//! # Design
//! The client reports through a `Logger` so hosts can route messages
//! wherever they like. Logging is a side channel: nothing a logger does
//! can change the outcome of a request. `NullLogger` is the default;
//! `TracingLogger` forwards to `tracing` events.

use serde_json::Value;

/// A sink for client log messages with optional structured context.
pub trait Logger: Send + Sync {
    fn banner(&self, message: &str, context: Option<&Value>);
    fn log(&self, message: &str, context: Option<&Value>);
    fn info(&self, message: &str, context: Option<&Value>);
    fn warning(&self, message: &str, context: Option<&Value>);
    fn error(&self, message: &str, context: Option<&Value>);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn banner(&self, _message: &str, _context: Option<&Value>) {}
    fn log(&self, _message: &str, _context: Option<&Value>) {}
    fn info(&self, _message: &str, _context: Option<&Value>) {}
    fn warning(&self, _message: &str, _context: Option<&Value>) {}
    fn error(&self, _message: &str, _context: Option<&Value>) {}
}

/// Forwards to the `tracing` macros. `banner` and `info` map to INFO,
/// `log` to DEBUG.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

fn render(context: Option<&Value>) -> String {
    context.map(Value::to_string).unwrap_or_default()
}

impl Logger for TracingLogger {
    fn banner(&self, message: &str, context: Option<&Value>) {
        tracing::info!(banner = true, context = %render(context), "{message}");
    }

    fn log(&self, message: &str, context: Option<&Value>) {
        tracing::debug!(context = %render(context), "{message}");
    }

    fn info(&self, message: &str, context: Option<&Value>) {
        tracing::info!(context = %render(context), "{message}");
    }

    fn warning(&self, message: &str, context: Option<&Value>) {
        tracing::warn!(context = %render(context), "{message}");
    }

    fn error(&self, message: &str, context: Option<&Value>) {
        tracing::error!(context = %render(context), "{message}");
    }
}
