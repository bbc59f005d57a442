//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They also record
//! the call site (`file`, `line`, `modulePath`) on the event and skip
//! formatting entirely when the level is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_gelf_appender::prelude::*;
//! use rust_gelf_appender::info;
//!
//! let logger = Logger::new("server");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With a marker
//! let audit = Marker::new("AUDIT");
//! info!(logger, marker: &audit, "User {} logged in", 42);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_gelf_appender::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_gelf_appender::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, marker: $marker:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            let event = $logger
                .new_event(level, format!($($arg)+))
                .with_location(file!(), line!(), module_path!())
                .with_marker(::std::clone::Clone::clone($marker));
            $logger.log_event(event);
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            let event = $logger
                .new_event(level, format!($($arg)+))
                .with_location(file!(), line!(), module_path!());
            $logger.log_event(event);
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_gelf_appender::prelude::*;
/// # let mut logger = Logger::new("app");
/// # logger.set_min_level(LogLevel::Trace);
/// use rust_gelf_appender::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_gelf_appender::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_gelf_appender::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_gelf_appender::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_gelf_appender::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
