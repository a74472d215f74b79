use log::trace;

/// Default capacity of the capture buffer, in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Fixed-capacity byte accumulator sitting between the child's pipe and the
/// record framer.
///
/// Storage is split in two regions: the *pending* region `[0, len)` holding
/// bytes not yet flushed, and the *free* region `[len, capacity)` that reads
/// land in directly. The buffer knows nothing about lines or records.
#[derive(Debug)]
pub struct CaptureBuffer {
    storage: Box<[u8]>,
    len: usize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capture buffer capacity must be non-zero");
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// Number of free bytes.
    pub fn space(&self) -> usize {
        self.storage.len() - self.len
    }

    /// Free region, to be filled by a read and then committed with [`feed`](Self::feed).
    pub fn space_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.len..]
    }

    /// Pending region.
    pub fn data(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Commits `n` bytes previously written into the free region.
    ///
    /// # Panics
    /// If `n` exceeds [`space`](Self::space).
    pub fn feed(&mut self, n: usize) {
        assert!(
            n <= self.space(),
            "feed of {} bytes exceeds free space {}",
            n,
            self.space()
        );
        self.len += n;
        trace!("capture buffer fed {} bytes ({}/{})", n, self.len, self.capacity());
    }

    /// Drops `n` bytes from the front of the pending region, shifting the
    /// remainder down.
    ///
    /// # Panics
    /// If `n` exceeds [`len`](Self::len).
    pub fn eat(&mut self, n: usize) {
        assert!(
            n <= self.len,
            "eat of {} bytes exceeds pending {}",
            n,
            self.len
        );
        self.storage.copy_within(n..self.len, 0);
        self.len -= n;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
