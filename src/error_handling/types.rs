use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NoDestination,
    MultipleDestinations(Vec<&'static str>),
    ConflictingNames,
    MissingCommand,
    EmptyName,
    MissingTarget,
    BadTarget(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NoDestination => {
                write!(f, "no destination selected, but one is required")
            }
            ConfigError::MultipleDestinations(d) => write!(
                f,
                "only one destination is supported at a time (got {})",
                d.join(", ")
            ),
            ConfigError::ConflictingNames => write!(f, "use either -p or -P, not both"),
            ConfigError::MissingCommand => write!(f, "no program given to run"),
            ConfigError::EmptyName => write!(f, "source name must not be empty"),
            ConfigError::MissingTarget => {
                write!(f, "netconsole requires a target (-t HOST[:PORT])")
            }
            ConfigError::BadTarget(e) => write!(f, "netconsole target error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum LaunchError {
    EmptyCommand,
    PipeFailed(std::io::Error),
    SpawnFailed(String, std::io::Error),
    ExecFailed(String, std::io::Error),
    DeviceOpenFailed(String, std::io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::EmptyCommand => write!(f, "no program given to run"),
            LaunchError::PipeFailed(e) => write!(f, "could not setup pipe(): {}", e),
            LaunchError::SpawnFailed(p, e) => write!(f, "could not spawn {}: {}", p, e),
            LaunchError::ExecFailed(p, e) => write!(f, "exec of {} failed: {}", p, e),
            LaunchError::DeviceOpenFailed(p, e) => write!(f, "could not open {}: {}", p, e),
        }
    }
}

impl std::error::Error for LaunchError {}

#[derive(Debug)]
pub enum CaptureError {
    ReadFailed(std::io::Error),
    SinkError(SinkError),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::ReadFailed(e) => write!(f, "read from child output failed: {}", e),
            CaptureError::SinkError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<SinkError> for CaptureError {
    fn from(err: SinkError) -> Self {
        CaptureError::SinkError(err)
    }
}

#[derive(Debug)]
pub enum SinkError {
    OpenFailed(String, std::io::Error),
    SocketFailed(std::io::Error),
    WriteFailed(&'static str, std::io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::OpenFailed(p, e) => write!(f, "could not open {}: {}", p, e),
            SinkError::SocketFailed(e) => {
                write!(f, "could not setup UDP socket for netconsole: {}", e)
            }
            SinkError::WriteFailed(k, e) => write!(f, "emit to {} failed: {}", k, e),
        }
    }
}

impl std::error::Error for SinkError {}

#[derive(Debug)]
pub enum ControllerError {
    LaunchError(LaunchError),
    SinkError(SinkError),
    CaptureError(CaptureError),
    ReapFailed(std::io::Error),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::LaunchError(e) => write!(f, "Launch error: {}", e),
            ControllerError::SinkError(e) => write!(f, "Destination error: {}", e),
            ControllerError::CaptureError(e) => write!(f, "Capture error: {}", e),
            ControllerError::ReapFailed(e) => write!(f, "could not collect child status: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<LaunchError> for ControllerError {
    fn from(err: LaunchError) -> Self {
        ControllerError::LaunchError(err)
    }
}

impl From<SinkError> for ControllerError {
    fn from(err: SinkError) -> Self {
        ControllerError::SinkError(err)
    }
}

impl From<CaptureError> for ControllerError {
    fn from(err: CaptureError) -> Self {
        ControllerError::CaptureError(err)
    }
}
