//! Destination subsystem
//!
//! This module provides the backends records are delivered to.
//!
//! Components:
//! - `sink_trait`: the RecordSink trait defining a uniform API.
//! - `kmsg`: the kernel ring buffer character device.
//! - `netconsole`: UDP datagrams to a remote netconsole listener.
//! - `syslog`: the local syslog daemon.

pub mod kmsg;
pub mod netconsole;
pub mod sink_trait;
pub mod syslog;

pub use kmsg::KmsgSink;
pub use netconsole::NetconsoleSink;
pub use sink_trait::RecordSink;
pub use syslog::SyslogSink;

use crate::configuration::{Destination, RelayConfig};
use crate::error_handling::types::SinkError;

/// Opens the write handle for the configured destination.
pub fn open_sink(config: &RelayConfig) -> Result<Box<dyn RecordSink>, SinkError> {
    let sink: Box<dyn RecordSink> = match &config.destination {
        Destination::Kmsg => Box::new(KmsgSink::open(&config.kmsg_path)?),
        Destination::Netconsole(target) => Box::new(NetconsoleSink::open(*target)?),
        Destination::Syslog => Box::new(SyslogSink::open()?),
    };
    Ok(sink)
}
