//! Engine logging: the `Logger` sink, log entries, and the `engine_*!`
//! macros every subsystem reports through.
//!
//! Sources are tagged `aurora3d::<Subsystem>` (`aurora3d::RenderGraphBuilder`,
//! `aurora3d::vulkan`). Errors raised with `engine_err!`/`engine_bail!` are
//! logged with their file and line before they are returned.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for engine log entries
///
/// Installed with `Engine::set_logger`. A logger only sees what the
/// macros emit; filtering is up to the implementation.
///
/// ```no_run
/// use std::sync::Mutex;
/// use aurora_3d_engine::aurora3d::Engine;
/// use aurora_3d_engine::aurora3d::log::{Logger, LogEntry, LogSeverity};
///
/// /// Keeps frame assembly warnings for an editor overlay
/// struct OverlayLogger {
///     lines: Mutex<Vec<String>>,
/// }
///
/// impl Logger for OverlayLogger {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity >= LogSeverity::Warn && entry.source == "aurora3d::FrameAssembler" {
///             if let Ok(mut lines) = self.lines.lock() {
///                 lines.push(entry.message.clone());
///             }
///         }
///     }
/// }
///
/// Engine::set_logger(OverlayLogger { lines: Mutex::new(Vec::new()) });
/// ```
pub trait Logger: Send + Sync {
    /// Process one log entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source subsystem (e.g., "aurora3d::RenderGraph", "aurora3d::vulkan")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose information (per-frame details)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (with file:line details)
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the default logger
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Colored console logger installed at startup
///
/// Lines look like `[timestamp] [SEVERITY] [source] message`, with
/// ` (file:line)` appended when the entry carries a location. Entries
/// below `min_severity` are dropped; per-frame traces are off unless
/// asked for.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    pub fn new(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    pub fn accepts(&self, severity: LogSeverity) -> bool {
        severity >= self.min_severity
    }

    /// Uncolored line for `entry`
    pub fn format_entry(entry: &LogEntry) -> String {
        let mut line = format!("[{}] [{}] [{}] {}",
            Self::timestamp(entry), entry.severity.label(), entry.source, entry.message);
        if let (Some(file), Some(line_no)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, line_no));
        }
        line
    }

    fn timestamp(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new(LogSeverity::Debug)
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if !self.accepts(entry.severity) {
            return;
        }

        let label = entry.severity.label();
        let severity = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line).as_str().dimmed().to_string(),
            _ => String::new(),
        };

        println!("[{}] [{}] [{}] {}{}",
            Self::timestamp(entry), severity, entry.source.bright_blue(), entry.message, location);
    }
}

// ===== LOGGING MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::aurora3d::Engine::log(
            $crate::aurora3d::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

/// Per-frame detail such as texture binding rebuilds
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// Resource creation and cache activity
///
/// ```no_run
/// aurora_3d_engine::engine_debug!("aurora3d::RenderGraph", "Framebuffer cached for view {}", 7);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

/// Lifecycle milestones: graph built, resize, scene transition
///
/// ```no_run
/// aurora_3d_engine::engine_info!("aurora3d::RenderGraph", "Resized to {}x{}", 1920, 1080);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

/// Recoverable problems, such as a model skipped for lack of a texture
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::aurora3d::Engine::log_detailed(
            $crate::aurora3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and evaluate to `Error::BackendError` with the same message
///
/// ```ignore
/// let pass = self.resources.get(&subgraph)
///     .and_then(|r| r.render_pass.clone())
///     .ok_or_else(|| engine_err!("aurora3d::RenderGraph", "No render pass for '{}'", subgraph))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::aurora3d::Engine::log_detailed(
            $crate::aurora3d::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::aurora3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(Error::BackendError(..))` from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
