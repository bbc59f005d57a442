//! GELF client transport
//!
//! [`GelfClient`] implements [`GelfTransport`](crate::core::GelfTransport)
//! over UDP (one datagram per message, optionally gzip-compressed) or TCP
//! (null-terminated JSON frames). Chunked UDP messages are not produced;
//! datagrams above `maxDatagramSize` are dropped and counted as failures.

pub mod client;
pub mod codec;
pub mod config;
#[cfg(feature = "tcp")]
mod tcp;
#[cfg(feature = "udp")]
mod udp;

pub use client::GelfClient;
pub use codec::GelfEncoder;
pub use config::{Compression, GelfConfiguration, GelfProtocol, DEFAULT_GELF_PORT};

use crate::core::Result;

/// Destination the client worker writes encoded frames to
pub(crate) trait FrameSink: Send {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
