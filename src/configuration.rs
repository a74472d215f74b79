pub mod config;
pub mod types;

pub use config::{Args, FileConfig};
pub use types::{netconsole_capacity_limit, Destination, DestinationKind, RelayConfig};
