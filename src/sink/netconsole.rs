use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use log::{info, trace};

use crate::data_capture::LogRecord;
use crate::error_handling::types::SinkError;
use crate::sink::sink_trait::RecordSink;

/// Sends each record as one UDP datagram to a netconsole listener.
#[derive(Debug)]
pub struct NetconsoleSink {
    socket: UdpSocket,
    target: SocketAddr,
    scratch: Vec<u8>,
}

impl NetconsoleSink {
    pub fn open(target: SocketAddr) -> Result<Self, SinkError> {
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).map_err(SinkError::SocketFailed)?;
        socket.connect(target).map_err(SinkError::SocketFailed)?;
        info!("Relaying to netconsole listener {}", target);
        Ok(Self {
            socket,
            target,
            scratch: Vec::new(),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl RecordSink for NetconsoleSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        self.scratch.clear();
        self.scratch.extend_from_slice(&record.header_bytes());
        self.scratch.extend_from_slice(record.payload);

        let sent = self
            .socket
            .send(&self.scratch)
            .map_err(|e| SinkError::WriteFailed("netconsole", e))?;
        trace!("netconsole datagram of {} bytes sent to {}", sent, self.target);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "netconsole"
    }
}
