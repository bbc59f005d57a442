//! Wire encoding of GELF messages

use super::config::Compression;
use crate::core::{GelfMessage, Result};
use flate2::write::GzEncoder;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// One message per datagram
    Datagram(Compression),
    /// JSON followed by a null byte
    NullTerminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GelfEncoder {
    framing: Framing,
}

impl GelfEncoder {
    pub fn for_udp(compression: Compression) -> Self {
        Self {
            framing: Framing::Datagram(compression),
        }
    }

    pub fn for_tcp() -> Self {
        Self {
            framing: Framing::NullTerminated,
        }
    }

    pub fn encode(&self, message: &GelfMessage) -> Result<Vec<u8>> {
        let mut json = message.to_json_bytes()?;
        match self.framing {
            Framing::Datagram(Compression::None) => Ok(json),
            Framing::Datagram(Compression::Gzip) => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(&json)?;
                Ok(encoder.finish()?)
            }
            Framing::NullTerminated => {
                // serde_json escapes control characters, so the payload holds no raw NUL
                json.push(0);
                Ok(json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn message() -> GelfMessage {
        GelfMessage::builder("Hello\u{0}World", "host").build().unwrap()
    }

    #[test]
    fn test_tcp_frame_has_single_trailing_null() {
        let frame = GelfEncoder::for_tcp().encode(&message()).unwrap();
        assert_eq!(frame.last(), Some(&0));
        assert_eq!(frame.iter().filter(|b| **b == 0).count(), 1);
    }

    #[test]
    fn test_gzip_datagram_decodes_to_json() {
        let frame = GelfEncoder::for_udp(Compression::Gzip).encode(&message()).unwrap();
        assert_eq!(&frame[..2], &[0x1f, 0x8b]);

        let mut json = String::new();
        GzDecoder::new(&frame[..]).read_to_string(&mut json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["short_message"], "Hello\u{0}World");
    }

    #[test]
    fn test_plain_datagram_is_json() {
        let frame = GelfEncoder::for_udp(Compression::None).encode(&message()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(value["version"], "1.1");
    }
}
