pub mod controller_handler;
#[cfg(test)]
mod tests;

pub use controller_handler::{relay_output, Controller, RelayStats, RunReport};
