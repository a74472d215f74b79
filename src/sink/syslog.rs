use std::ffi::CString;

use log::{debug, trace};

use crate::data_capture::{LogRecord, Priority};
use crate::error_handling::types::SinkError;
use crate::sink::sink_trait::RecordSink;

/// Submits records to the local syslog daemon through `syslog(3)`.
///
/// The logging call wants one formatted string plus a separate priority, so
/// unlike the descriptor backends the record is flattened first, see
/// [`syslog_message`].
#[derive(Debug)]
pub struct SyslogSink {
    _private: (),
}

impl SyslogSink {
    pub fn open() -> Result<Self, SinkError> {
        // SAFETY: a null ident makes the C library use the program name; no
        // pointer is retained
        unsafe { libc::openlog(std::ptr::null(), libc::LOG_NDELAY, libc::LOG_USER) };
        debug!("Relaying to local syslog");
        Ok(Self { _private: () })
    }
}

impl Drop for SyslogSink {
    fn drop(&mut self) {
        // SAFETY: closelog has no preconditions
        unsafe { libc::closelog() };
    }
}

impl RecordSink for SyslogSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        let (priority, message) = syslog_message(record);
        trace!(
            "syslog record at {} with {} bytes",
            priority,
            message.as_bytes().len()
        );
        // SAFETY: both the format and the message are NUL-terminated and
        // the format consumes exactly one string argument
        unsafe {
            libc::syslog(
                libc::c_int::from(priority.level()),
                c"%s".as_ptr(),
                message.as_ptr(),
            )
        };
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "syslog"
    }
}

/// Splits a record into the priority and the message text `syslog(3)` takes.
///
/// The priority comes from the header when there is one. An unnamed record
/// has no header, so a `<d>` marker at the start of its payload is used and
/// stripped instead; failing both it is INFO. The text is `name: ` (when
/// named) followed by the payload, cut at the first NUL byte.
pub fn syslog_message(record: &LogRecord<'_>) -> (Priority, CString) {
    let (priority, mut text) = match &record.header {
        Some(header) => {
            let mut text = Vec::with_capacity(header.name.len() + 2 + record.payload.len());
            text.extend_from_slice(header.name.as_bytes());
            text.extend_from_slice(b": ");
            text.extend_from_slice(record.payload);
            (header.priority, text)
        }
        None => match Priority::from_marker(record.payload) {
            Some(p) => (p, record.payload[3..].to_vec()),
            None => (Priority::INFO, record.payload.to_vec()),
        },
    };

    if let Some(nul) = text.iter().position(|&b| b == 0) {
        text.truncate(nul);
    }
    (priority, CString::new(text).unwrap_or_default())
}
