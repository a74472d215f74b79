use log::{debug, error, info, trace};
use std::io::{ErrorKind, Read};

use crate::configuration::RelayConfig;
use crate::data_capture::{CaptureBuffer, PrefixComposer, Priority, RecordFramer};
use crate::error_handling::types::*;
use crate::process_management::{ChildExit, ChildProcess, ProcessLauncher};
use crate::sink::{open_sink, RecordSink};

/// Counters for one run of the capture loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub records: u64,
    pub bytes: u64,
}

/// Outcome of a relay run that reached the end of the child's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub child: ChildExit,
    pub stats: RelayStats,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.child.relay_exit_code()
    }
}

/// Drives one relay: spawn the child, open the destination, pump records
/// until the child's output ends, then drain and reap.
pub struct Controller {
    pub config: RelayConfig,
}

impl Controller {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Runs the whole relay against the configured destination.
    ///
    /// In direct kmsg mode this replaces the current process and only
    /// returns if that fails.
    pub fn run(&self) -> Result<RunReport, ControllerError> {
        let launcher = ProcessLauncher::new(self.config.command.clone())?;

        if self.config.wants_direct_kmsg() {
            info!(
                "Handing {} directly to {}",
                self.config.kmsg_path.display(),
                launcher.program()
            );
            return Err(launcher.exec_direct(&self.config.kmsg_path).into());
        }

        // destination is opened only once the pipe exists, so a failing
        // child is still observable
        let mut child = launcher.spawn()?;
        let mut sink = match open_sink(&self.config) {
            Ok(sink) => sink,
            Err(e) => {
                child.terminate();
                return Err(e.into());
            }
        };
        self.relay_child(child, &mut sink)
    }

    /// Relays an already spawned child into `sink` until its output ends.
    pub fn relay_child<S: RecordSink + ?Sized>(
        &self,
        mut child: ChildProcess,
        sink: &mut S,
    ) -> Result<RunReport, ControllerError> {
        let composer = PrefixComposer::new(self.config.name.clone());

        if self.config.announce {
            let text = format!("started {} (pid {})\n", child.program(), child.id());
            if let Err(e) = sink.emit(&composer.notice(Priority::INFO, text.as_bytes())) {
                child.terminate();
                return Err(e.into());
            }
        }

        let mut buf = CaptureBuffer::new(self.config.buffer_capacity);
        let mut framer = RecordFramer::new(self.config.framing);
        let stats = match relay_output(
            child.output_mut(),
            &mut buf,
            &mut framer,
            &composer,
            sink,
        ) {
            Ok(stats) => stats,
            Err(e) => {
                error!("[{}] relay to {} stopped: {}", child.program(), sink.kind(), e);
                child.terminate();
                return Err(e.into());
            }
        };

        let exit = child
            .reap(self.config.reap_grace)
            .map_err(ControllerError::ReapFailed)?;

        if self.config.announce {
            let priority = if exit.success() {
                Priority::INFO
            } else {
                Priority::WARNING
            };
            let text = format!("{} {}\n", child.program(), exit);
            sink.emit(&composer.notice(priority, text.as_bytes()))?;
        }

        info!(
            "[{}] output ended after {} records ({} bytes); child {}",
            child.program(),
            stats.records,
            stats.bytes,
            exit
        );
        Ok(RunReport { child: exit, stats })
    }
}

/// The capture loop.
///
/// Reads straight into the buffer's free region, hands every record the
/// framer finds to the composer and then to `sink`, and returns once
/// `reader` reports end of stream. Whatever partial record is left at that
/// point is flushed too. A read error ends the loop without retrying.
pub fn relay_output<R, S>(
    reader: &mut R,
    buf: &mut CaptureBuffer,
    framer: &mut RecordFramer,
    composer: &PrefixComposer,
    sink: &mut S,
) -> Result<RelayStats, CaptureError>
where
    R: Read + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut stats = RelayStats::default();
    loop {
        // every pass below leaves room, otherwise a zero-length read would
        // look like end of stream
        debug_assert!(buf.space() > 0);
        let n = match reader.read(buf.space_mut()) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("read returned error: {}", e);
                return Err(CaptureError::ReadFailed(e));
            }
        };
        buf.feed(n);

        while let Some(len) = framer.next_record(buf) {
            emit_front(buf, len, composer, sink, &mut stats)?;
        }
    }

    debug!("child output reached end of stream");
    if let Some(len) = framer.finish(buf) {
        trace!("draining {} pending bytes", len);
        emit_front(buf, len, composer, sink, &mut stats)?;
    }
    Ok(stats)
}

fn emit_front<S: RecordSink + ?Sized>(
    buf: &mut CaptureBuffer,
    len: usize,
    composer: &PrefixComposer,
    sink: &mut S,
    stats: &mut RelayStats,
) -> Result<(), CaptureError> {
    sink.emit(&composer.compose(&buf.data()[..len]))?;
    buf.eat(len);
    stats.records += 1;
    stats.bytes += len as u64;
    Ok(())
}
