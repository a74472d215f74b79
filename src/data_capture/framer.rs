use log::trace;

use super::buffer::CaptureBuffer;
use super::types::Framing;

/// Decides where records end inside a [`CaptureBuffer`].
///
/// The framer remembers how much of the pending region it has already
/// scanned, so each byte is looked at once no matter how many reads it took
/// to complete a line.
///
/// Usage after every read:
///
/// ```ignore
/// while let Some(len) = framer.next_record(&buf) {
///     emit(&buf.data()[..len]);
///     buf.eat(len);
/// }
/// ```
#[derive(Debug)]
pub struct RecordFramer {
    framing: Framing,
    scanned: usize,
}

impl RecordFramer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            scanned: 0,
        }
    }

    /// Length of the next complete record at the front of `buf`, if any.
    ///
    /// The caller must `eat` exactly the returned length before calling
    /// again.
    pub fn next_record(&mut self, buf: &CaptureBuffer) -> Option<usize> {
        let pending = buf.data();
        if self.framing == Framing::Line {
            let start = self.scanned.min(pending.len());
            if let Some(i) = pending[start..].iter().position(|&b| b == b'\n') {
                self.scanned = 0;
                return Some(start + i + 1);
            }
            self.scanned = pending.len();
        }

        if buf.is_full() {
            trace!("capture buffer full, forcing a {} byte record", pending.len());
            self.scanned = 0;
            return Some(pending.len());
        }
        None
    }

    /// Length of whatever partial record is left once the stream has ended.
    pub fn finish(&mut self, buf: &CaptureBuffer) -> Option<usize> {
        self.scanned = 0;
        (!buf.is_empty()).then(|| buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(buf: &mut CaptureBuffer, bytes: &[u8]) {
        buf.space_mut()[..bytes.len()].copy_from_slice(bytes);
        buf.feed(bytes.len());
    }

    fn drain(framer: &mut RecordFramer, buf: &mut CaptureBuffer) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(len) = framer.next_record(buf) {
            out.push(buf.data()[..len].to_vec());
            buf.eat(len);
        }
        out
    }

    #[test]
    fn line_framing_splits_on_newlines() {
        let mut buf = CaptureBuffer::new(64);
        let mut framer = RecordFramer::new(Framing::Line);

        push(&mut buf, b"one\ntwo\nthr");
        assert_eq!(drain(&mut framer, &mut buf), vec![b"one\n".to_vec(), b"two\n".to_vec()]);
        assert_eq!(buf.data(), b"thr");

        push(&mut buf, b"ee\n");
        assert_eq!(drain(&mut framer, &mut buf), vec![b"three\n".to_vec()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn line_framing_force_flushes_full_buffer() {
        let mut buf = CaptureBuffer::new(8);
        let mut framer = RecordFramer::new(Framing::Line);

        push(&mut buf, b"abcde");
        assert!(drain(&mut framer, &mut buf).is_empty());

        push(&mut buf, b"fgh");
        assert_eq!(drain(&mut framer, &mut buf), vec![b"abcdefgh".to_vec()]);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn capacity_framing_ignores_newlines() {
        let mut buf = CaptureBuffer::new(8);
        let mut framer = RecordFramer::new(Framing::Capacity);

        push(&mut buf, b"a\nb\n");
        assert!(drain(&mut framer, &mut buf).is_empty());

        push(&mut buf, b"c\nd\n");
        assert_eq!(drain(&mut framer, &mut buf), vec![b"a\nb\nc\nd\n".to_vec()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn capacity_plus_one_spans_two_records() {
        let mut buf = CaptureBuffer::new(8);
        let mut framer = RecordFramer::new(Framing::Capacity);

        // first read only gets as much as fits
        let input = [b'z'; 9];
        let n = buf.space();
        push(&mut buf, &input[..n]);
        assert_eq!(buf.len(), 8);
        let records = drain(&mut framer, &mut buf);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 8);

        push(&mut buf, &input[n..]);
        assert!(drain(&mut framer, &mut buf).is_empty());
        assert_eq!(framer.finish(&buf), Some(1));
    }

    #[test]
    fn finish_returns_partial_line() {
        let mut buf = CaptureBuffer::new(16);
        let mut framer = RecordFramer::new(Framing::Line);

        push(&mut buf, b"tail");
        assert!(drain(&mut framer, &mut buf).is_empty());
        assert_eq!(framer.finish(&buf), Some(4));

        buf.clear();
        assert_eq!(framer.finish(&buf), None);
    }
}
