//! Sink Trait
//!
//! This module defines the `RecordSink` trait, the interface every destination
//! backend implements.
//!
//! Implementors are responsible for:
//! - Writing one framed and prefixed record per call
//! - Keeping a record together in a single write so it arrives as one entry
//!
//! Writes block and are never retried; any error is returned to the relay,
//! which treats it as fatal.

use crate::data_capture::LogRecord;
use crate::error_handling::types::SinkError;

pub trait RecordSink {
    /// Delivers one record to the destination.
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError>;

    /// Short destination name for diagnostics.
    fn kind(&self) -> &'static str;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        (**self).emit(record)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
