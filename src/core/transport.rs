//! Transport trait for delivering GELF messages

use super::error::Result;
use super::gelf_message::GelfMessage;
use std::time::Duration;

/// Delivery contract consumed by the GELF appender.
///
/// One transport is shared by every thread that logs, so implementations
/// must be safe for concurrent use.
pub trait GelfTransport: Send + Sync {
    /// Hand over a message, waiting while the transport cannot accept it yet.
    fn send(&self, message: GelfMessage) -> Result<()>;

    /// Hand over a message without waiting.
    ///
    /// Returns `false` if the message was not accepted (queue full, stopped).
    fn try_send(&self, message: GelfMessage) -> bool;

    /// Wait until every accepted message has been written, or `timeout` elapses.
    fn flush(&self, timeout: Duration) -> Result<()>;

    /// Stop accepting messages and release resources after draining.
    fn stop(&self);
}
