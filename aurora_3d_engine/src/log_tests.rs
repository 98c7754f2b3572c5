//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, and the
//! error-producing macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use crate::error::Error;
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "aurora3d::RenderGraph".to_string(),
        message: format!("{:?} message", severity),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Info.label().trim(), "INFO");
}

#[test]
fn test_log_severity_copy() {
    let sev1 = LogSeverity::Info;
    let sev2 = sev1;
    assert_eq!(sev1, sev2);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let e = entry(LogSeverity::Error, Some("render_graph.rs"), Some(42));
    assert_eq!(e.source, "aurora3d::RenderGraph");
    assert_eq!(e.file, Some("render_graph.rs"));
    assert_eq!(e.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let e1 = entry(LogSeverity::Warn, Some("scene.rs"), Some(10));
    let e2 = e1.clone();
    assert_eq!(e1.severity, e2.severity);
    assert_eq!(e1.message, e2.message);
    assert_eq!(e1.line, e2.line);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger::new(LogSeverity::Trace);
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Just verify neither branch panics
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(7)));
    }
}

#[test]
fn test_default_logger_filters_below_min_severity() {
    let logger = DefaultLogger::new(LogSeverity::Warn);
    assert!(!logger.accepts(LogSeverity::Trace));
    assert!(!logger.accepts(LogSeverity::Info));
    assert!(logger.accepts(LogSeverity::Warn));
    assert!(logger.accepts(LogSeverity::Error));
}

#[test]
fn test_default_logger_hides_per_frame_traces() {
    let logger = DefaultLogger::default();
    assert_eq!(logger.min_severity(), LogSeverity::Debug);
    assert!(!logger.accepts(LogSeverity::Trace));
}

#[test]
fn test_format_entry_appends_location_only_when_known() {
    let plain = DefaultLogger::format_entry(&entry(LogSeverity::Info, None, None));
    assert!(plain.ends_with("[INFO ] [aurora3d::RenderGraph] Info message"));

    let located = DefaultLogger::format_entry(&entry(LogSeverity::Error, Some("render_graph.rs"), Some(42)));
    assert!(located.ends_with("[ERROR] [aurora3d::RenderGraph] Error message (render_graph.rs:42)"));
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

struct CountingLogger {
    count: std::sync::Mutex<usize>,
}

impl Logger for CountingLogger {
    fn log(&self, _entry: &LogEntry) {
        *self.count.lock().unwrap() += 1;
    }
}

#[test]
fn test_custom_logger_implementation() {
    let logger = CountingLogger { count: std::sync::Mutex::new(0) };
    logger.log(&entry(LogSeverity::Info, None, None));
    logger.log(&entry(LogSeverity::Info, None, None));
    assert_eq!(*logger.count.lock().unwrap(), 2);
}

// ============================================================================
// ERROR MACROS
// ============================================================================

#[test]
fn test_engine_err_produces_backend_error() {
    let err = crate::engine_err!("aurora3d::test", "image {} missing", 3);
    match err {
        Error::BackendError(msg) => assert_eq!(msg, "image 3 missing"),
        other => panic!("Expected BackendError, got {:?}", other),
    }
}

#[test]
fn test_engine_bail_returns_early() {
    fn fails(flag: bool) -> crate::error::Result<u32> {
        if flag {
            crate::engine_bail!("aurora3d::test", "flag was set");
        }
        Ok(1)
    }

    assert!(fails(false).is_ok());
    assert!(matches!(fails(true), Err(Error::BackendError(ref m)) if m == "flag was set"));
}
