//! Appender implementations

pub mod gelf;

pub use gelf::{GelfAppender, GelfAppenderBuilder, GelfAppenderConfig};

pub use crate::core::Appender;
