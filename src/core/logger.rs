//! Main logger implementation
//!
//! The logger turns calls into [`LogEvent`]s (capturing the calling thread's
//! context) and dispatches them synchronously to its appenders.

use super::{
    appender::Appender,
    error::{GelfError, Result},
    log_event::LogEvent,
    log_level::LogLevel,
    marker::Marker,
    metrics::LoggerMetrics,
    status,
    thrown::ThrownError,
};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct Logger {
    name: String,
    min_level: Arc<RwLock<LogLevel>>,
    appenders: Arc<RwLock<Vec<Box<dyn Appender>>>>,
    /// Metrics for observability (dropped count, total logged)
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: Arc::new(RwLock::new(LogLevel::Info)),
            appenders: Arc::new(RwLock::new(Vec::new())),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_appender(&mut self, appender: Box<dyn Appender>) {
        let mut appenders = self.appenders.write();
        appenders.push(appender);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        let mut min_level = self.min_level.write();
        *min_level = level;
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    /// Create an event for this logger, capturing the calling thread's context
    pub fn new_event(&self, level: LogLevel, message: impl Into<String>) -> LogEvent {
        LogEvent::new(level, message)
            .with_logger_name(self.name.clone())
            .with_thread_context()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        self.log_event(self.new_event(level, message));
    }

    pub fn log_with_marker(&self, level: LogLevel, marker: &Marker, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        let event = self.new_event(level, message).with_marker(marker.clone());
        self.log_event(event);
    }

    pub fn log_thrown(&self, level: LogLevel, message: impl Into<String>, thrown: ThrownError) {
        if !self.is_enabled(level) {
            return;
        }
        let event = self.new_event(level, message).with_thrown(thrown);
        self.log_event(event);
    }

    /// Log an error value together with its `source()` chain
    pub fn log_error<E>(&self, level: LogLevel, message: impl Into<String>, error: &E)
    where
        E: std::error::Error + 'static,
    {
        self.log_thrown(level, message, ThrownError::from_error(error));
    }

    /// Dispatch a prepared event. Appender failures are reported, never returned.
    pub fn log_event(&self, event: LogEvent) {
        if !self.is_enabled(event.level) {
            return;
        }
        let _ = self.dispatch(&event);
    }

    /// Dispatch a prepared event and return the first appender failure.
    ///
    /// Every appender still receives the event when an earlier one fails.
    pub fn try_log_event(&self, event: LogEvent) -> Result<()> {
        if !self.is_enabled(event.level) {
            return Ok(());
        }
        self.dispatch(&event)
    }

    fn dispatch(&self, event: &LogEvent) -> Result<()> {
        let mut appenders = self.appenders.write();
        Self::process_sync(&mut appenders, event, &self.metrics)
    }

    /// Process an event with per-appender panic isolation
    ///
    /// One failing or panicking appender doesn't prevent the others from
    /// receiving the event.
    fn process_sync(
        appenders: &mut [Box<dyn Appender>],
        event: &LogEvent,
        metrics: &LoggerMetrics,
    ) -> Result<()> {
        let mut first_error = None;

        for appender in appenders.iter_mut() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(event)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    status::report_error(appender.name(), &e);
                    first_error.get_or_insert(e);
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    status::report_error(
                        appender.name(),
                        format!("panicked: {}. Other appenders continue to function.", panic_msg),
                    );
                    first_error.get_or_insert(GelfError::other(format!(
                        "appender '{}' panicked: {}",
                        appender.name(),
                        panic_msg
                    )));
                }
            }
        }

        match first_error {
            Some(e) => {
                metrics.record_dropped();
                Err(e)
            }
            None => {
                metrics.record_logged();
                Ok(())
            }
        }
    }

    /// Get the number of events at least one appender failed on
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("root")
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            status::report_error(&self.name, format!("failed to flush during shutdown: {}", e));
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_gelf_appender::prelude::*;
///
/// let logger = Logger::builder()
///     .name("payments")
///     .min_level(LogLevel::Debug)
///     .build();
///
/// assert_eq!(logger.name(), "payments");
/// assert!(logger.is_enabled(LogLevel::Debug));
/// ```
pub struct LoggerBuilder {
    name: String,
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            name: "root".to_string(),
            min_level: LogLevel::Info,
            appenders: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    pub fn build(self) -> Logger {
        let mut logger = Logger::new(self.name);
        logger.set_min_level(self.min_level);
        for appender in self.appenders {
            logger.add_appender(appender);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
