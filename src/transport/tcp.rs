//! TCP delivery of null-terminated GELF frames
//!
//! The connection is opened lazily on the first frame. On a write error the
//! stream is dropped, one reconnect is attempted and the frame is resent.
//! After a failed connection attempt, further attempts wait for the
//! configured reconnect delay and fail fast until then.

use super::{config::GelfConfiguration, FrameSink};
use crate::core::{GelfError, Result};
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct TcpSink {
    stream: Option<TcpStream>,
    address: String,
    connect_timeout: Duration,
    reconnect_delay: Duration,
    no_delay: bool,
    last_failed_connect: Option<Instant>,
}

impl TcpSink {
    pub(crate) fn new(config: &GelfConfiguration) -> Self {
        Self {
            stream: None,
            address: config.address(),
            connect_timeout: config.connect_timeout(),
            reconnect_delay: config.reconnect_delay(),
            no_delay: config.tcp_no_delay,
            last_failed_connect: None,
        }
    }

    fn connect(&mut self) -> Result<()> {
        if let Some(failed_at) = self.last_failed_connect {
            if failed_at.elapsed() < self.reconnect_delay {
                return Err(GelfError::io_operation(
                    "connecting to collector",
                    format!("{} (waiting before reconnecting)", self.address),
                    io::Error::from(io::ErrorKind::NotConnected),
                ));
            }
        }

        match self.open_stream() {
            Ok(stream) => {
                self.stream = Some(stream);
                self.last_failed_connect = None;
                Ok(())
            }
            Err(e) => {
                self.last_failed_connect = Some(Instant::now());
                Err(GelfError::io_operation("connecting to collector", &self.address, e))
            }
        }
    }

    fn open_stream(&self) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    // Set timeouts to prevent hanging
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    stream.set_nodelay(self.no_delay)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("'{}' did not resolve", self.address),
            )
        }))
    }

    fn write_connected(&mut self, frame: &[u8]) -> Result<()> {
        if self.stream.is_none() {
            self.connect()?;
        }
        match self.stream.as_mut() {
            Some(stream) => Ok(stream.write_all(frame)?),
            None => Err(GelfError::TransportClosed),
        }
    }
}

impl FrameSink for TcpSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let had_stream = self.stream.is_some();
        match self.write_connected(frame) {
            Ok(()) => Ok(()),
            Err(first) if had_stream => {
                // Connection lost; reconnect and resend once
                self.stream = None;
                self.write_connected(frame).map_err(|retry| {
                    self.stream = None;
                    GelfError::other(format!(
                        "failed to send frame and reconnect: {} (reconnect: {})",
                        first, retry
                    ))
                })
            }
            Err(e) => {
                self.stream = None;
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn test_connects_lazily_and_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut sink = TcpSink::new(&GelfConfiguration::new("127.0.0.1", port));
        assert!(sink.stream.is_none());

        sink.write_frame(b"{}\0").unwrap();
        sink.flush().unwrap();

        let (mut conn, _) = listener.accept().unwrap();
        let mut buf = [0u8; 3];
        conn.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"{}\0");
    }

    #[test]
    fn test_failed_connect_waits_for_reconnect_delay() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = GelfConfiguration::new("127.0.0.1", port)
            .with_reconnect_delay(Duration::from_secs(60));
        let mut sink = TcpSink::new(&config);

        assert!(sink.write_frame(b"{}\0").is_err());
        let failed_at = sink.last_failed_connect.expect("failure recorded");

        let second = sink.write_frame(b"{}\0").unwrap_err();
        assert!(second.to_string().contains("waiting before reconnecting"));
        assert_eq!(sink.last_failed_connect, Some(failed_at));
    }
}
