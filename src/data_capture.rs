pub mod buffer;
pub mod framer;
pub mod prefix;
pub mod types;

pub use buffer::CaptureBuffer;
pub use framer::RecordFramer;
pub use prefix::PrefixComposer;
pub use types::{Framing, Header, LogRecord, Priority};
