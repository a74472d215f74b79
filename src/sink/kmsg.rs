use std::fs::{File, OpenOptions};
use std::io::{IoSlice, Write};
use std::path::Path;

use log::{info, trace, warn};

use crate::data_capture::LogRecord;
use crate::error_handling::types::SinkError;
use crate::sink::sink_trait::RecordSink;

/// Longest single write `/dev/kmsg` accepts; longer ones fail with `EINVAL`.
pub const KMSG_MAX_WRITE: usize = 976;

/// Writes records to the kernel ring buffer device.
///
/// Every `write` on `/dev/kmsg` becomes one kernel log entry, which also
/// parses a leading `<P>` itself, so header and payload go out in a single
/// vectored write. Records longer than [`KMSG_MAX_WRITE`] are cut into
/// several entries, each repeating the header.
#[derive(Debug)]
pub struct KmsgSink {
    device: File,
}

impl KmsgSink {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let device = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| SinkError::OpenFailed(path.display().to_string(), e))?;
        info!("Relaying to kmsg device {}", path.display());
        Ok(Self { device })
    }

    /// Wraps an already opened device.
    pub fn from_file(device: File) -> Self {
        Self { device }
    }

    fn write_entry(&mut self, header: &[u8], payload: &[u8]) -> Result<(), SinkError> {
        let parts = [IoSlice::new(header), IoSlice::new(payload)];
        let written = self
            .device
            .write_vectored(&parts)
            .map_err(|e| SinkError::WriteFailed("kmsg", e))?;

        let len = header.len() + payload.len();
        if written < len {
            warn!("kmsg accepted {} of {} bytes of a record", written, len);
        } else {
            trace!("kmsg entry of {} bytes written", written);
        }
        Ok(())
    }
}

impl RecordSink for KmsgSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        let header = record.header_bytes();
        let room = KMSG_MAX_WRITE.saturating_sub(header.len());
        if room == 0 || record.payload.len() <= room {
            return self.write_entry(&header, record.payload);
        }

        trace!(
            "kmsg record of {} bytes split into entries of at most {}",
            record.len(),
            KMSG_MAX_WRITE
        );
        for piece in record.payload.chunks(room) {
            self.write_entry(&header, piece)?;
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "kmsg"
    }
}
