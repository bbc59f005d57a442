//! Log event structure

use super::log_level::LogLevel;
use super::marker::Marker;
use super::thread_context::{ContextSnapshot, ThreadContext};
use super::thrown::ThrownError;
use chrono::{DateTime, Utc};
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// A single log call, as seen by appenders
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub logger_name: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub module_path: Option<String>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub marker: Option<Marker>,
    pub context: ContextSnapshot,
    pub thrown: Option<ThrownError>,
}

impl LogEvent {
    /// Create an event stamped with the current time and calling thread.
    ///
    /// The thread context is not captured here; use [`LogEvent::with_thread_context`]
    /// or log through a `Logger`, which captures it.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            logger_name: String::new(),
            timestamp: Utc::now(),
            file: None,
            line: None,
            module_path: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            marker: None,
            context: ContextSnapshot::default(),
            thrown: None,
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_location(mut self, file: &str, line: u32, module_path: &str) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.module_path = Some(module_path.to_string());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_thrown(mut self, thrown: ThrownError) -> Self {
        self.thrown = Some(thrown);
        self
    }

    pub fn with_context(mut self, context: ContextSnapshot) -> Self {
        self.context = context;
        self
    }

    /// Attach a snapshot of the calling thread's context
    pub fn with_thread_context(mut self) -> Self {
        self.context = ThreadContext::snapshot();
        self
    }
}
