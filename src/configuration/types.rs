use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::data_capture::Framing;

/// Default location of the kernel ring buffer device.
pub const KMSG_PATH: &str = "/dev/kmsg";
/// Port the Linux netconsole listener uses when none is given.
pub const NETCONSOLE_DEFAULT_PORT: u16 = 6666;
pub const MIN_BUFFER_CAPACITY: usize = 64;
pub const MAX_BUFFER_CAPACITY: usize = 1 << 20;
pub const DEFAULT_REAP_GRACE: Duration = Duration::from_millis(1000);
/// Largest payload a single UDP datagram over IPv4 can carry.
pub const MAX_DATAGRAM_PAYLOAD: usize = 65507;

/// Largest buffer capacity whose records still fit into one netconsole
/// datagram once the `<P>name: ` header is added.
///
/// Unnamed runs reserve room for the lifecycle notice name.
pub fn netconsole_capacity_limit(name: Option<&str>) -> usize {
    let name = name.unwrap_or(crate::data_capture::prefix::DEFAULT_NOTICE_NAME);
    MAX_DATAGRAM_PAYLOAD - (name.len() + 5)
}

/// Destination as named in a configuration file.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Kmsg,
    Netconsole,
    Syslog,
}

impl DestinationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DestinationKind::Kmsg => "kmsg",
            DestinationKind::Netconsole => "netconsole",
            DestinationKind::Syslog => "syslog",
        }
    }
}

/// The single active output backend for a run.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Destination {
    Kmsg,
    Netconsole(SocketAddr),
    Syslog,
}

impl Destination {
    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::Kmsg => DestinationKind::Kmsg,
            Destination::Netconsole(_) => DestinationKind::Netconsole,
            Destination::Syslog => DestinationKind::Syslog,
        }
    }
}

/// Fully resolved configuration handed to the relay.
#[derive(Debug, PartialEq, Clone)]
pub struct RelayConfig {
    pub destination: Destination,
    /// Source name placed in each record header.
    pub name: Option<String>,
    /// Program followed by its arguments; never empty.
    pub command: Vec<String>,
    pub framing: Framing,
    pub buffer_capacity: usize,
    /// Emit a record when the child starts and when it ends.
    pub announce: bool,
    pub kmsg_path: PathBuf,
    /// How long to wait for the child to become reapable after its output closes.
    pub reap_grace: Duration,
}

impl RelayConfig {
    /// Builds a configuration with defaults for everything but the essentials.
    pub fn new(destination: Destination, name: Option<String>, command: Vec<String>) -> Self {
        Self {
            destination,
            name,
            command,
            framing: Framing::default(),
            buffer_capacity: crate::data_capture::buffer::DEFAULT_CAPACITY,
            announce: false,
            kmsg_path: PathBuf::from(KMSG_PATH),
            reap_grace: DEFAULT_REAP_GRACE,
        }
    }

    /// Whether the child can write straight into the kmsg device without a
    /// relaying parent. Only valid when records need no transformation.
    pub fn wants_direct_kmsg(&self) -> bool {
        self.destination == Destination::Kmsg && self.name.is_none() && !self.announce
    }
}
