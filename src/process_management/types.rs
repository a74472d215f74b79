//! Core types used by the process management subsystem.

use log::{debug, warn};
use std::fmt;
use std::io::{self, PipeReader};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How the supervised program ended, as far as the relay could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited normally with the given code.
    Exited(i32),
    /// Terminated by the given signal.
    Signaled(i32),
    /// Output closed but the process was still alive when the grace period ran out.
    StillRunning,
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ChildExit::Exited(code),
            (None, Some(sig)) => ChildExit::Signaled(sig),
            // neither code nor signal only happens for stopped/continued states
            (None, None) => ChildExit::StillRunning,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }

    /// Status the relay itself exits with once the child's output has ended.
    ///
    /// A failing child's code is propagated, a signal maps to `128 + signal`
    /// like a shell does, and anything else is still a failure: the stream
    /// the relay exists for has stopped.
    pub fn relay_exit_code(&self) -> i32 {
        match *self {
            ChildExit::Exited(code) if code != 0 => code,
            ChildExit::Signaled(sig) => 128 + sig,
            _ => 1,
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exited with status {}", code),
            ChildExit::Signaled(sig) => write!(f, "killed by signal {}", sig),
            ChildExit::StillRunning => write!(f, "closed its output but is still running"),
        }
    }
}

/// A spawned program together with the read end of its output pipe.
pub struct ChildProcess {
    pub(crate) child: Child,
    pub(crate) output: PipeReader,
    pub(crate) program: String,
}

impl ChildProcess {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Read end of the pipe carrying the child's stdout and stderr.
    pub fn output_mut(&mut self) -> &mut PipeReader {
        &mut self.output
    }

    /// Collects the child's exit status, polling for at most `grace`.
    ///
    /// End-of-stream can be observed a moment before the kernel makes the
    /// exit status available, so a single `try_wait` is not enough. If the
    /// child outlives `grace` it is left running and
    /// [`ChildExit::StillRunning`] is returned.
    pub fn reap(&mut self, grace: Duration) -> io::Result<ChildExit> {
        let deadline = Instant::now() + grace;
        loop {
            if let Some(status) = self.child.try_wait()? {
                let exit = ChildExit::from_status(status);
                debug!("[{}] child {} {}", self.program, self.child.id(), exit);
                return Ok(exit);
            }
            if Instant::now() >= deadline {
                warn!(
                    "[{}] child {} still running {:?} after its output closed",
                    self.program,
                    self.child.id(),
                    grace
                );
                return Ok(ChildExit::StillRunning);
            }
            std::thread::sleep(REAP_POLL_INTERVAL);
        }
    }

    /// Best-effort kill and wait, used when the relay gives up early.
    pub fn terminate(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("[{}] kill of child {} failed: {}", self.program, self.child.id(), e);
        }
        if let Err(e) = self.child.wait() {
            warn!("[{}] wait for child {} failed: {}", self.program, self.child.id(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_for_the_relay() {
        assert_eq!(ChildExit::Exited(0).relay_exit_code(), 1);
        assert_eq!(ChildExit::Exited(3).relay_exit_code(), 3);
        assert_eq!(ChildExit::Signaled(9).relay_exit_code(), 137);
        assert_eq!(ChildExit::StillRunning.relay_exit_code(), 1);
    }

    #[test]
    fn from_raw_status() {
        // wait(2) encoding: exit code in the high byte, signal in the low bits
        assert_eq!(
            ChildExit::from_status(ExitStatus::from_raw(2 << 8)),
            ChildExit::Exited(2)
        );
        assert_eq!(
            ChildExit::from_status(ExitStatus::from_raw(15)),
            ChildExit::Signaled(15)
        );
        assert!(ChildExit::Exited(0).success());
        assert!(!ChildExit::Signaled(15).success());
    }

    #[test]
    fn display_reads_naturally() {
        assert_eq!(ChildExit::Exited(0).to_string(), "exited with status 0");
        assert_eq!(ChildExit::Signaled(9).to_string(), "killed by signal 9");
    }
}
