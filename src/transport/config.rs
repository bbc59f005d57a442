//! Connection settings for the GELF client

use crate::core::{GelfError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default GELF input port used by Graylog
pub const DEFAULT_GELF_PORT: u16 = 12201;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GelfProtocol {
    #[default]
    Udp,
    Tcp,
}

/// Payload compression for UDP datagrams. TCP frames are never compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gzip,
}

/// Where and how the client delivers messages
///
/// # Example
///
/// ```
/// use rust_gelf_appender::transport::{GelfConfiguration, GelfProtocol};
///
/// let config: GelfConfiguration = serde_json::from_str(
///     r#"{ "host": "graylog.internal", "protocol": "tcp", "queueSize": 1024 }"#,
/// ).unwrap();
///
/// assert_eq!(config.protocol, GelfProtocol::Tcp);
/// assert_eq!(config.port, 12201);
/// assert_eq!(config.queue_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GelfConfiguration {
    pub host: String,
    pub port: u16,
    pub protocol: GelfProtocol,
    /// Capacity of the client's outbound queue
    pub queue_size: usize,
    pub connect_timeout_ms: u64,
    /// Minimum spacing between TCP connection attempts after a failure
    pub reconnect_delay_ms: u64,
    pub tcp_no_delay: bool,
    pub compression: Compression,
    /// Largest encoded UDP datagram; bigger messages are dropped
    pub max_datagram_size: usize,
}

impl Default for GelfConfiguration {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_GELF_PORT,
            protocol: GelfProtocol::Udp,
            queue_size: 512,
            connect_timeout_ms: 1000,
            reconnect_delay_ms: 500,
            tcp_no_delay: false,
            compression: Compression::Gzip,
            max_datagram_size: 8192,
        }
    }
}

impl GelfConfiguration {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: GelfProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    #[must_use]
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_tcp_no_delay(mut self, enable: bool) -> Self {
        self.tcp_no_delay = enable;
        self
    }

    #[must_use]
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// `host:port`, bracketing IPv6 literals
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(GelfError::config("GelfConfiguration", "host must not be empty"));
        }
        if self.port == 0 {
            return Err(GelfError::config("GelfConfiguration", "port must not be 0"));
        }
        if self.queue_size == 0 {
            return Err(GelfError::config("GelfConfiguration", "queueSize must be at least 1"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(GelfError::config(
                "GelfConfiguration",
                "connectTimeoutMs must be at least 1",
            ));
        }
        if self.protocol == GelfProtocol::Udp && self.max_datagram_size == 0 {
            return Err(GelfError::config(
                "GelfConfiguration",
                "maxDatagramSize must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GelfConfiguration::default();
        assert_eq!(config.address(), "127.0.0.1:12201");
        assert_eq!(config.protocol, GelfProtocol::Udp);
        assert_eq!(config.compression, Compression::Gzip);
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_saturate() {
        let config = GelfConfiguration::default()
            .with_connect_timeout(Duration::MAX)
            .with_reconnect_delay(Duration::from_millis(1500));
        assert_eq!(config.connect_timeout_ms, u64::MAX);
        assert_eq!(config.reconnect_delay_ms, 1500);
    }

    #[test]
    fn test_ipv6_address() {
        let config = GelfConfiguration::new("::1", 12201);
        assert_eq!(config.address(), "[::1]:12201");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GelfConfiguration::new("", 12201).validate().is_err());
        assert!(GelfConfiguration::new("localhost", 0).validate().is_err());
        assert!(GelfConfiguration::new("localhost", 12201)
            .with_queue_size(0)
            .validate()
            .is_err());
        assert!(GelfConfiguration::new("localhost", 12201)
            .with_max_datagram_size(0)
            .validate()
            .is_err());
        assert!(GelfConfiguration::new("localhost", 12201)
            .with_protocol(GelfProtocol::Tcp)
            .with_max_datagram_size(0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_deserialize_lowercase_enums() {
        let config: GelfConfiguration =
            serde_json::from_str(r#"{ "compression": "none", "tcpNoDelay": true }"#).unwrap();
        assert_eq!(config.compression, Compression::None);
        assert!(config.tcp_no_delay);
        assert_eq!(config.queue_size, 512);
    }
}
