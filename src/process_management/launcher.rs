use log::{debug, error, info};
use std::fs::OpenOptions;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error_handling::types::LaunchError;
use crate::process_management::types::ChildProcess;

/// Starts the supervised program.
///
/// The program is looked up through `PATH` the way a shell would. Its stdin
/// is inherited; stdout and stderr are remapped onto whatever handle the
/// chosen launch mode supplies.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    command: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(command: Vec<String>) -> Result<Self, LaunchError> {
        if command.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        Ok(Self { command })
    }

    pub fn program(&self) -> &str {
        &self.command[0]
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]).stdin(Stdio::inherit());
        cmd
    }

    /// Spawns the program with stdout and stderr both writing into a fresh
    /// pipe, and returns the child with the pipe's read end.
    ///
    /// Errors if the pipe cannot be created or the program cannot be
    /// executed; exec failures surface here rather than in the child.
    pub fn spawn(&self) -> Result<ChildProcess, LaunchError> {
        let (reader, writer) = std::io::pipe().map_err(|e| {
            error!("could not setup pipe(): {}", e);
            LaunchError::PipeFailed(e)
        })?;
        let stderr_end = writer.try_clone().map_err(LaunchError::PipeFailed)?;

        let mut cmd = self.build();
        cmd.stdout(Stdio::from(writer)).stderr(Stdio::from(stderr_end));

        debug!("Spawning {:?}", self.command);
        let child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn {}: {}", self.program(), e);
            LaunchError::SpawnFailed(self.program().to_string(), e)
        })?;
        // the command still owns our copies of the write end; EOF only
        // arrives once they are gone
        drop(cmd);

        info!("Started {} (pid {})", self.program(), child.id());
        Ok(ChildProcess {
            child,
            output: reader,
            program: self.program().to_string(),
        })
    }

    /// Replaces the current process with the program, its stdout and stderr
    /// opened directly on `device`. No pipe and no relaying parent remain.
    ///
    /// Only returns on failure.
    pub fn exec_direct(&self, device: &Path) -> LaunchError {
        let open_failed = |e: std::io::Error| {
            LaunchError::DeviceOpenFailed(device.display().to_string(), e)
        };
        let stdout_dev = match OpenOptions::new().read(true).write(true).open(device) {
            Ok(f) => f,
            Err(e) => return open_failed(e),
        };
        let stderr_dev = match stdout_dev.try_clone() {
            Ok(f) => f,
            Err(e) => return open_failed(e),
        };

        debug!("Executing {:?} directly onto {}", self.command, device.display());
        let e = self.build().stdout(stdout_dev).stderr(stderr_dev).exec();
        error!("exec of {} failed: {}", self.program(), e);
        LaunchError::ExecFailed(self.program().to_string(), e)
    }
}
