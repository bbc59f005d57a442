//! UDP delivery: one datagram per message

use super::{config::GelfConfiguration, FrameSink};
use crate::core::{GelfError, Result};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

pub(crate) struct UdpSink {
    socket: UdpSocket,
    max_datagram_size: usize,
}

impl UdpSink {
    pub(crate) fn connect(config: &GelfConfiguration) -> Result<Self> {
        let address = config.address();
        let target = address
            .to_socket_addrs()
            .map_err(|e| GelfError::io_operation("resolving collector address", &address, e))?
            .next()
            .ok_or_else(|| GelfError::config("UdpSink", format!("'{}' did not resolve", address)))?;

        let local: SocketAddr = if target.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)
            .map_err(|e| GelfError::io_operation("binding UDP socket", local.to_string(), e))?;
        socket
            .connect(target)
            .map_err(|e| GelfError::io_operation("connecting UDP socket", &address, e))?;

        Ok(Self {
            socket,
            max_datagram_size: config.max_datagram_size,
        })
    }
}

impl FrameSink for UdpSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > self.max_datagram_size {
            return Err(GelfError::MessageTooLarge {
                size: frame.len(),
                max: self.max_datagram_size,
            });
        }
        self.socket.send(frame)?;
        Ok(())
    }
}
