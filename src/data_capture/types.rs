//! Common data types used across the data_capture subsystem.

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// Syslog-style severity carried in a `<P>` record header.
///
/// Only the eight levels `0` (emergency) through `7` (debug) exist; the numeric
/// values line up with the `LOG_*` constants of `syslog(3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    pub const EMERG: Priority = Priority(0);
    pub const ALERT: Priority = Priority(1);
    pub const CRIT: Priority = Priority(2);
    pub const ERR: Priority = Priority(3);
    pub const WARNING: Priority = Priority(4);
    pub const NOTICE: Priority = Priority(5);
    pub const INFO: Priority = Priority(6);
    pub const DEBUG: Priority = Priority(7);

    /// Parses an ASCII digit `'0'..='7'`.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'0'..=b'7' => Some(Priority(digit - b'0')),
            _ => None,
        }
    }

    /// Reads a leading three-byte `<d>` marker, if the payload starts with one.
    pub fn from_marker(payload: &[u8]) -> Option<Self> {
        match payload {
            [b'<', d, b'>', ..] => Self::from_digit(*d),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn as_digit(self) -> u8 {
        b'0' + self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.0 {
            0 => "emerg",
            1 => "alert",
            2 => "crit",
            3 => "err",
            4 => "warning",
            5 => "notice",
            6 => "info",
            _ => "debug",
        };
        write!(f, "{}", label)
    }
}

/// How pending bytes are cut into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// One record per `\n`-terminated line; a full buffer without a newline
    /// is flushed as-is.
    #[default]
    Line,
    /// One record per full buffer, newlines ignored.
    Capacity,
}

/// `<P>name: ` prefix placed in front of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub priority: Priority,
    pub name: &'a str,
}

impl Header<'_> {
    /// Renders the header into its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.name.len() + 5);
        out.extend_from_slice(&[b'<', self.priority.as_digit(), b'>']);
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(b": ");
        out
    }
}

/// A single record on its way to a destination. Borrows from the capture
/// buffer and never outlives one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub header: Option<Header<'a>>,
    pub payload: &'a [u8],
}

impl LogRecord<'_> {
    pub fn header_bytes(&self) -> Vec<u8> {
        self.header.as_ref().map(Header::to_bytes).unwrap_or_default()
    }

    /// Header followed by payload, as one contiguous buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header_bytes();
        out.extend_from_slice(self.payload);
        out
    }

    pub fn len(&self) -> usize {
        self.header.as_ref().map_or(0, |h| h.name.len() + 5) + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
