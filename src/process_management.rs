//! Child process management.
//!
//! This module spawns the supervised program with its standard output and
//! standard error both redirected onto the write end of one pipe, and keeps
//! the read end for the relay. When no per-record transformation is needed
//! for kmsg, it can instead hand the device straight to the program and
//! replace the current process.
//!
//! Re-exports:
//! - [`ProcessLauncher`]: builds and starts the command.
//! - [`ChildProcess`], [`ChildExit`]: the running child and how it ended.
//!
//! Example (non-running):
//! ```ignore
//! use logto::process_management::ProcessLauncher;
//! use std::io::Read;
//!
//! let launcher = ProcessLauncher::new(vec!["echo".into(), "hi".into()])?;
//! let mut child = launcher.spawn()?;
//! let mut out = String::new();
//! child.output_mut().read_to_string(&mut out)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod launcher;
pub mod types;

pub use launcher::ProcessLauncher;
pub use types::{ChildExit, ChildProcess};
