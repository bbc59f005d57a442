//! Error types for the GELF appender

use std::time::Duration;

pub type Result<T> = std::result::Result<T, GelfError>;

#[derive(Debug, thiserror::Error)]
pub enum GelfError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A GELF message could not be built from the event
    #[error("Invalid GELF message: {reason}")]
    InvalidMessage { reason: String },

    /// Additional field name rejected by the GELF naming rules
    #[error("Invalid GELF field name '{key}'")]
    InvalidFieldName { key: String },

    /// Transport stopped or worker gone
    #[error("Transport closed")]
    TransportClosed,

    /// Encoded message does not fit in a single datagram
    #[error("Message too large: {size} bytes exceeds limit of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    /// Flush did not complete in time
    #[error("Flush did not complete within {timeout:?}")]
    FlushTimeout { timeout: Duration },

    /// Blocking delivery failed and the appender is not ignoring exceptions
    #[error("Appender '{appender}' failed to deliver message: {source}")]
    Delivery {
        appender: String,
        #[source]
        source: Box<GelfError>,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl GelfError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        GelfError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid message error
    pub fn invalid_message(reason: impl Into<String>) -> Self {
        GelfError::InvalidMessage {
            reason: reason.into(),
        }
    }

    /// Create an invalid field name error
    pub fn invalid_field(key: impl Into<String>) -> Self {
        GelfError::InvalidFieldName { key: key.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        GelfError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Wrap a transport failure with the name of the appender that hit it
    pub fn delivery(appender: impl Into<String>, source: GelfError) -> Self {
        GelfError::Delivery {
            appender: appender.into(),
            source: Box::new(source),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GelfError::Other(msg.into())
    }
}
