//! # Logger Module
//!
//! The logging capability handed to every part of the server core.
//!
//! Nothing in the core reaches for ambient global state to log: the route
//! trie builder, the dispatcher, and the connection acceptor all receive an
//! `Arc<dyn Logger>` at construction. A logger is a sink for [`LogEvent`]s
//! (level, module tag, message, optional elapsed duration); the provided
//! methods `debug`, `log`, `warn`, `error` and `perf_log` build the event and
//! forward it to [`Logger::emit`].
//!
//! ## Implementations
//!
//! - [`TracingLogger`] - forwards events to `tracing` with structured fields
//!   (`module`, `elapsed_ms`, `status`). This is what the binary uses.
//! - [`NoopLogger`] - discards everything.
//! - [`MemoryLogger`] - keeps events in memory so tests can assert on them.
//!
//! ## Example
//!
//! ```rust
//! use sprint::logger::{Logger, TracingLogger};
//! use std::time::Duration;
//!
//! let logger = TracingLogger;
//! logger.log("ServerCore", "Starting Sprint Application ...");
//! logger.perf_log("ViewResolver", "Mapped GET, {{ ping }}", Duration::from_micros(12), Default::default());
//! ```

use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Severity of a [`LogEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Log,
    Warn,
    Error,
}

/// Outcome tag attached to performance events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerfStatus {
    #[default]
    Ok,
    Warn,
    Error,
}

impl PerfStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PerfStatus::Ok => "OK",
            PerfStatus::Warn => "WARN",
            PerfStatus::Error => "ERROR",
        }
    }
}

/// A single structured log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    /// Tag of the component that emitted the event (e.g. `ServerCore`)
    pub module: String,
    pub message: String,
    /// Present for performance events only
    pub elapsed: Option<Duration>,
    pub status: Option<PerfStatus>,
}

/// Logging capability threaded through server construction
pub trait Logger: Send + Sync {
    /// Receive one event. Must not block for long: it is called from
    /// connection coroutines.
    fn emit(&self, event: LogEvent);

    fn debug(&self, module: &str, message: &str) {
        self.emit(LogEvent {
            level: LogLevel::Debug,
            module: module.to_string(),
            message: message.to_string(),
            elapsed: None,
            status: None,
        });
    }

    fn log(&self, module: &str, message: &str) {
        self.emit(LogEvent {
            level: LogLevel::Log,
            module: module.to_string(),
            message: message.to_string(),
            elapsed: None,
            status: None,
        });
    }

    fn warn(&self, module: &str, message: &str) {
        self.emit(LogEvent {
            level: LogLevel::Warn,
            module: module.to_string(),
            message: message.to_string(),
            elapsed: None,
            status: None,
        });
    }

    fn error(&self, module: &str, message: &str) {
        self.emit(LogEvent {
            level: LogLevel::Error,
            module: module.to_string(),
            message: message.to_string(),
            elapsed: None,
            status: None,
        });
    }

    /// Log a message together with the time an operation took
    fn perf_log(&self, module: &str, message: &str, elapsed: Duration, status: PerfStatus) {
        let level = match status {
            PerfStatus::Ok => LogLevel::Log,
            PerfStatus::Warn => LogLevel::Warn,
            PerfStatus::Error => LogLevel::Error,
        };
        self.emit(LogEvent {
            level,
            module: module.to_string(),
            message: message.to_string(),
            elapsed: Some(elapsed),
            status: Some(status),
        });
    }
}

/// Forwards events to the `tracing` subscriber installed by
/// [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn emit(&self, event: LogEvent) {
        let module = event.module.as_str();
        let message = event.message.as_str();
        match (event.elapsed, event.status) {
            (Some(elapsed), Some(status)) => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                let status = status.as_str();
                match event.level {
                    LogLevel::Debug => debug!(module, elapsed_ms, status, "{}", message),
                    LogLevel::Log => info!(module, elapsed_ms, status, "{}", message),
                    LogLevel::Warn => warn!(module, elapsed_ms, status, "{}", message),
                    LogLevel::Error => error!(module, elapsed_ms, status, "{}", message),
                }
            }
            _ => match event.level {
                LogLevel::Debug => debug!(module, "{}", message),
                LogLevel::Log => info!(module, "{}", message),
                LogLevel::Warn => warn!(module, "{}", message),
                LogLevel::Error => error!(module, "{}", message),
            },
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn emit(&self, _event: LogEvent) {}
}

/// Collects events in memory, in emission order
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event received so far
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events of the given level whose module tag matches
    #[must_use]
    pub fn find(&self, level: LogLevel, module: &str) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level && e.module == module)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn emit(&self, event: LogEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
