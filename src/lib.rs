//! # Rust GELF Appender
//!
//! A logging appender that ships events to Graylog-compatible collectors as
//! GELF 1.1 messages over UDP or TCP.
//!
//! ## Features
//!
//! - **Exceptions**: stack traces as full message, optionally with the whole cause chain
//! - **Thread Context**: per-thread map and stack captured into every event
//! - **Markers**: hierarchical markers attached as a message field
//! - **Delivery Modes**: blocking hand-over or non-blocking try-send with drop accounting
//!
//! ## Example
//!
//! ```
//! use rust_gelf_appender::prelude::*;
//! use rust_gelf_appender::transport::GelfConfiguration;
//!
//! let appender = GelfAppender::builder("graylog")
//!     .include_exception_cause(true)
//!     .server(GelfConfiguration::new("127.0.0.1", 12201))
//!     .build()?;
//!
//! let mut logger = Logger::new("app");
//! logger.add_appender(Box::new(appender));
//!
//! ThreadContext::put("requestId", "abc-123");
//! rust_gelf_appender::info!(logger, "Handled {} requests", 3);
//! ThreadContext::clear_all();
//! # Ok::<(), GelfError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;
pub mod transport;

pub mod prelude {
    pub use crate::appenders::{GelfAppender, GelfAppenderBuilder, GelfAppenderConfig};
    pub use crate::core::{
        Appender, ContextGuard, ContextSnapshot, DeliveryMetrics, FieldValue, Filter, GelfError,
        GelfLevel, GelfMessage, GelfTransport, Layout, LogEvent, LogLevel, Logger, LoggerBuilder,
        LoggerMetrics, Marker, MarkerFilter, MarkerManager, Result, StackEntry, ThreadContext,
        ThresholdFilter, ThrownError,
    };
}

pub use appenders::{GelfAppender, GelfAppenderBuilder, GelfAppenderConfig};
pub use core::{
    Appender, ContextGuard, ContextSnapshot, DeliveryMetrics, FieldValue, Filter, GelfError,
    GelfLevel, GelfMessage, GelfMessageBuilder, GelfTransport, Layout, LogEvent, LogLevel, Logger,
    LoggerBuilder, LoggerMetrics, Marker, MarkerFilter, MarkerManager, Result, StackEntry,
    ThreadContext, ThresholdFilter, ThrownError, GELF_VERSION,
};
pub use transport::{GelfClient, GelfConfiguration};
