use std::net::UdpSocket;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::configuration::{netconsole_capacity_limit, Destination, RelayConfig};
use crate::controller::Controller;
use crate::data_capture::{LogRecord, Priority};
use crate::error_handling::types::{ControllerError, LaunchError, SinkError};
use crate::process_management::{ChildExit, ProcessLauncher};
use crate::sink::syslog::syslog_message;
use crate::sink::{KmsgSink, RecordSink};

fn sh_command(script: &str) -> Vec<String> {
    vec!["/bin/sh".into(), "-c".into(), script.into()]
}

fn config(destination: Destination, name: Option<&str>, script: &str) -> RelayConfig {
    let mut cfg = RelayConfig::new(destination, name.map(str::to_string), sh_command(script));
    cfg.reap_grace = Duration::from_secs(5);
    cfg
}

/// Records what the syslog backend would submit, without touching the host's
/// syslog.
#[derive(Default)]
struct SyslogRecorder {
    calls: Vec<(Priority, Vec<u8>)>,
}

impl RecordSink for SyslogRecorder {
    fn emit(&mut self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        let (priority, message) = syslog_message(record);
        self.calls.push((priority, message.into_bytes()));
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "syslog-recorder"
    }
}

fn relay_into<S: RecordSink>(cfg: &RelayConfig, sink: &mut S) -> Result<crate::controller::RunReport, ControllerError> {
    let child = ProcessLauncher::new(cfg.command.clone())?.spawn()?;
    Controller::new(cfg.clone()).relay_child(child, sink)
}

#[test]
fn syslog_gets_priority_and_named_text() {
    let cfg = config(
        Destination::Syslog,
        Some("watchdog"),
        "printf '<1>critical error\\n'",
    );
    let mut sink = SyslogRecorder::default();
    let report = relay_into(&cfg, &mut sink).unwrap();

    assert_eq!(
        sink.calls,
        vec![(Priority::ALERT, b"watchdog: critical error\n".to_vec())]
    );
    assert_eq!(report.child, ChildExit::Exited(0));
    assert_eq!(report.stats.records, 1);
}

#[test]
fn kmsg_without_name_writes_bytes_unmodified() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let cfg = config(Destination::Kmsg, None, "printf 'no marker here\\n'");
    let mut sink = KmsgSink::open(device.path()).unwrap();
    relay_into(&cfg, &mut sink).unwrap();

    assert_eq!(std::fs::read(device.path()).unwrap(), b"no marker here\n");
}

#[test]
fn kmsg_with_name_through_full_run() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let mut cfg = config(
        Destination::Kmsg,
        Some("svc"),
        "echo starting; echo '<3>boom' >&2; printf 'unterminated'",
    );
    cfg.kmsg_path = device.path().to_path_buf();

    let report = Controller::new(cfg).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(device.path()).unwrap(),
        "<6>svc: starting\n<3>svc: boom\n<6>svc: unterminated"
    );
    assert_eq!(report.stats.records, 3);
}

#[test]
fn silent_child_ends_with_failure_instead_of_hanging() {
    let cfg = config(Destination::Syslog, None, "true");
    let mut sink = SyslogRecorder::default();
    let started = Instant::now();
    let report = relay_into(&cfg, &mut sink).unwrap();

    assert!(sink.calls.is_empty());
    assert_eq!(report.child, ChildExit::Exited(0));
    assert_ne!(report.exit_code(), 0);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn child_that_closes_output_but_lives_is_not_waited_for() {
    let mut cfg = config(Destination::Syslog, None, "exec >&- 2>&-; sleep 2");
    cfg.reap_grace = Duration::from_millis(50);
    let mut sink = SyslogRecorder::default();
    let started = Instant::now();
    let report = relay_into(&cfg, &mut sink).unwrap();

    assert_eq!(report.child, ChildExit::StillRunning);
    assert_eq!(report.exit_code(), 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn failing_child_status_is_propagated() {
    let cfg = config(Destination::Syslog, Some("job"), "echo bye; exit 3");
    let mut sink = SyslogRecorder::default();
    let report = relay_into(&cfg, &mut sink).unwrap();

    assert_eq!(sink.calls, vec![(Priority::INFO, b"job: bye\n".to_vec())]);
    assert_eq!(report.exit_code(), 3);
}

#[test]
fn announce_brackets_child_output() {
    let mut cfg = config(Destination::Syslog, None, "echo work; exit 2");
    cfg.announce = true;
    let mut sink = SyslogRecorder::default();
    relay_into(&cfg, &mut sink).unwrap();

    assert_eq!(sink.calls.len(), 3);
    let (prio, first) = &sink.calls[0];
    assert_eq!(*prio, Priority::INFO);
    assert!(first.starts_with(b"logto: started /bin/sh (pid "));
    assert_eq!(sink.calls[1], (Priority::INFO, b"work\n".to_vec()));
    assert_eq!(
        sink.calls[2],
        (
            Priority::WARNING,
            b"logto: /bin/sh exited with status 2\n".to_vec()
        )
    );
}

#[test]
fn netconsole_run_sends_datagrams() {
    let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
    listener
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let cfg = config(
        Destination::Netconsole(listener.local_addr().unwrap()),
        Some("net"),
        "echo one; echo '<4>two'",
    );

    Controller::new(cfg).run().unwrap();

    let mut buf = [0u8; 128];
    let n = listener.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"<6>net: one\n");
    let n = listener.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"<4>net: two\n");
}

#[test]
fn missing_program_is_a_launch_error() {
    let cfg = RelayConfig::new(
        Destination::Syslog,
        None,
        vec!["/nonexistent/logto-missing".into()],
    );
    assert!(matches!(
        Controller::new(cfg).run(),
        Err(ControllerError::LaunchError(LaunchError::SpawnFailed(_, _)))
    ));
}

#[test]
fn unopenable_destination_is_fatal() {
    let mut cfg = config(Destination::Kmsg, Some("svc"), "sleep 5");
    cfg.kmsg_path = PathBuf::from("/nonexistent/dir/kmsg");
    let started = Instant::now();

    assert!(matches!(
        Controller::new(cfg).run(),
        Err(ControllerError::SinkError(SinkError::OpenFailed(_, _)))
    ));
    // the child is killed rather than waited out
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn netconsole_long_line_is_split_into_fitting_datagrams() {
    let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
    listener
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut cfg = config(
        Destination::Netconsole(listener.local_addr().unwrap()),
        None,
        "head -c 80000 /dev/zero | tr '\\0' x; echo",
    );
    cfg.buffer_capacity = netconsole_capacity_limit(None);

    let report = Controller::new(cfg).run().unwrap();
    assert_eq!(report.stats.records, 2);

    let mut buf = vec![0u8; 65536];
    let first = listener.recv(&mut buf).unwrap();
    assert_eq!(first, netconsole_capacity_limit(None));
    let second = listener.recv(&mut buf).unwrap();
    assert_eq!(first + second, 80001);
    assert_eq!(buf[second - 1], b'\n');
}

/// Refuses every record.
struct RejectingSink;

impl RecordSink for RejectingSink {
    fn emit(&mut self, _record: &LogRecord<'_>) -> Result<(), SinkError> {
        Err(SinkError::WriteFailed(
            "rejecting",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"),
        ))
    }

    fn kind(&self) -> &'static str {
        "rejecting"
    }
}

#[test]
fn failed_start_notice_kills_the_child() {
    let mut cfg = config(Destination::Syslog, Some("svc"), "sleep 30");
    cfg.announce = true;
    let child = ProcessLauncher::new(cfg.command.clone())
        .unwrap()
        .spawn()
        .unwrap();
    let pid = child.id();
    let started = Instant::now();

    let result = Controller::new(cfg).relay_child(child, &mut RejectingSink);
    assert!(matches!(
        result,
        Err(ControllerError::SinkError(SinkError::WriteFailed("rejecting", _)))
    ));
    assert!(started.elapsed() < Duration::from_secs(30));
    // killed and reaped, so nothing is left under /proc
    assert!(!PathBuf::from(format!("/proc/{}", pid)).exists());
}
