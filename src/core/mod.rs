//! Core logger types and traits

pub mod appender;
pub mod error;
pub mod gelf_message;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod marker;
pub mod metrics;
pub(crate) mod status;
pub mod thread_context;
pub mod thrown;
pub mod transport;

pub use appender::{Appender, Filter, Layout, MarkerFilter, ThresholdFilter};
pub use error::{GelfError, Result};
pub use gelf_message::{is_valid_field_key, GelfMessage, GelfMessageBuilder, GELF_VERSION};
pub use log_event::LogEvent;
pub use log_level::{GelfLevel, LogLevel};
pub use logger::{Logger, LoggerBuilder};
pub use marker::{Marker, MarkerManager};
pub use metrics::{DeliveryMetrics, LoggerMetrics};
pub use thread_context::{ContextGuard, ContextSnapshot, FieldValue, StackEntry, ThreadContext};
pub use thrown::ThrownError;
pub use transport::GelfTransport;
