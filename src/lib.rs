pub mod configuration;
pub mod controller;
pub mod data_capture;
pub mod error_handling;
pub mod process_management;
pub mod sink;

pub use configuration::{Args, Destination, RelayConfig};
pub use controller::Controller;
