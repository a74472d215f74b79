use super::types::*;
use crate::data_capture::prefix::auto_name;
use crate::data_capture::Framing;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::debug;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command-line surface of `logto`.
///
/// Destination flags are plain booleans on purpose: selecting none or
/// several is reported by [`RelayConfig::resolve`] so that a destination
/// coming from a configuration file can take part in the same check.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "logto")]
#[command(version)]
#[command(about = "Run a program and send its output to kmsg, syslog or netconsole")]
#[command(override_usage = "logto [OPTIONS] -- <PROGRAM> [ARGS]...")]
pub struct Args {
    /// Send output to /dev/kmsg
    #[arg(short = 'k')]
    pub kmsg: bool,

    /// Send output to netconsole (udp)
    #[arg(short = 'n')]
    pub netconsole: bool,

    /// Send output to syslog (local)
    #[arg(short = 's')]
    pub syslog: bool,

    /// Include NAME in the redirected output
    #[arg(short = 'p', value_name = "NAME")]
    pub name: Option<String>,

    /// As if `-p` was used with the last element of PROGRAM
    #[arg(short = 'P')]
    pub auto_name: bool,

    /// Netconsole listener, HOST[:PORT] (port defaults to 6666)
    #[arg(short = 't', long = "target", env = "LOGTO_NETCONSOLE_TARGET")]
    pub target: Option<String>,

    /// How output is cut into records
    #[arg(short = 'f', long = "framing", value_enum)]
    pub framing: Option<Framing>,

    /// Emit a record when the program starts and when it exits
    #[arg(short = 'a', long = "announce")]
    pub announce: bool,

    /// TOML file providing defaults for any of the above
    #[arg(short = 'c', long = "config", env = "LOGTO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Program to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "PROGRAM")]
    pub command: Vec<String>,
}

impl Args {
    pub fn from_args() -> Self {
        Args::parse()
    }
}

/// Defaults read from a TOML file. Every key is optional and the command
/// line wins wherever both say something.
///
/// ```toml
/// destination = "netconsole"
/// netconsole_target = "10.0.0.1:6666"
/// auto_name = true
/// framing = "line"
/// buffer_capacity = 4096
/// ```
#[derive(Debug, Default, PartialEq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub destination: Option<DestinationKind>,
    pub name: Option<String>,
    #[serde(default)]
    pub auto_name: bool,
    pub netconsole_target: Option<String>,
    pub framing: Option<Framing>,
    pub buffer_capacity: Option<usize>,
    #[serde(default)]
    pub announce: bool,
    pub kmsg_path: Option<PathBuf>,
    pub reap_grace_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration file {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }
}

impl RelayConfig {
    /// Reads the configuration file named by `args`, if any, and resolves.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match args.config.as_deref() {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    /// Merges command-line arguments over file defaults and validates the
    /// result.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let selected: Vec<DestinationKind> = [
            (args.kmsg, DestinationKind::Kmsg),
            (args.netconsole, DestinationKind::Netconsole),
            (args.syslog, DestinationKind::Syslog),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect();

        let kind = match selected.as_slice() {
            [] => file.destination.ok_or(ConfigError::NoDestination)?,
            [one] => *one,
            many => {
                return Err(ConfigError::MultipleDestinations(
                    many.iter().map(|k| k.as_str()).collect(),
                ))
            }
        };

        if args.command.is_empty() {
            return Err(ConfigError::MissingCommand);
        }

        let (explicit, auto) = if args.name.is_some() || args.auto_name {
            (args.name, args.auto_name)
        } else {
            (file.name, file.auto_name)
        };
        let name = match (explicit, auto) {
            (Some(_), true) => return Err(ConfigError::ConflictingNames),
            (Some(name), false) => Some(name),
            (None, true) => Some(auto_name(&args.command[0]).to_string()),
            (None, false) => None,
        };
        if name.as_deref() == Some("") {
            return Err(ConfigError::EmptyName);
        }

        let destination = match kind {
            DestinationKind::Kmsg => Destination::Kmsg,
            DestinationKind::Syslog => Destination::Syslog,
            DestinationKind::Netconsole => {
                let target = args
                    .target
                    .or(file.netconsole_target)
                    .ok_or(ConfigError::MissingTarget)?;
                Destination::Netconsole(parse_target(&target)?)
            }
        };

        let buffer_capacity = file
            .buffer_capacity
            .unwrap_or(crate::data_capture::buffer::DEFAULT_CAPACITY);
        if !(MIN_BUFFER_CAPACITY..=MAX_BUFFER_CAPACITY).contains(&buffer_capacity) {
            return Err(ConfigError::NotInRange(format!(
                "buffer_capacity {} must be between {} and {}",
                buffer_capacity, MIN_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY
            )));
        }
        if let Destination::Netconsole(_) = destination {
            let limit = netconsole_capacity_limit(name.as_deref());
            if buffer_capacity > limit {
                return Err(ConfigError::NotInRange(format!(
                    "buffer_capacity {} exceeds {}, the most one netconsole datagram can carry",
                    buffer_capacity, limit
                )));
            }
        }

        let mut config = RelayConfig::new(destination, name, args.command);
        config.framing = args.framing.or(file.framing).unwrap_or_default();
        config.buffer_capacity = buffer_capacity;
        config.announce = args.announce || file.announce;
        if let Some(path) = file.kmsg_path {
            config.kmsg_path = path;
        }
        if let Some(ms) = file.reap_grace_ms {
            config.reap_grace = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Resolves `HOST[:PORT]` into a socket address, defaulting the port to the
/// netconsole one.
pub fn parse_target(target: &str) -> Result<SocketAddr, ConfigError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ConfigError::MissingTarget);
    }
    if let Ok(addr) = target.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, NETCONSOLE_DEFAULT_PORT));
    }

    let resolved = if target.contains(':') {
        target.to_socket_addrs()
    } else {
        (target, NETCONSOLE_DEFAULT_PORT).to_socket_addrs()
    };
    resolved
        .map_err(|e| ConfigError::BadTarget(format!("{}: {}", target, e)))?
        .next()
        .ok_or_else(|| ConfigError::BadTarget(format!("{}: no address found", target)))
}
