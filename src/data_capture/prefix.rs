use super::types::{Header, LogRecord, Priority};

/// Name used on lifecycle notices when no source name was configured.
pub const DEFAULT_NOTICE_NAME: &str = "logto";

/// Turns raw record bytes into a [`LogRecord`] with the configured `<P>name: `
/// header.
///
/// With a name configured every record gets a header. A `<d>` marker already
/// present at the start of the payload moves into the header and is stripped;
/// otherwise the header says INFO. Without a name the payload is passed
/// through untouched, marker included, and downstream interprets it.
#[derive(Debug, Clone, Default)]
pub struct PrefixComposer {
    name: Option<String>,
}

impl PrefixComposer {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn compose<'a>(&'a self, payload: &'a [u8]) -> LogRecord<'a> {
        let Some(name) = self.name.as_deref() else {
            return LogRecord {
                header: None,
                payload,
            };
        };

        let (priority, payload) = match Priority::from_marker(payload) {
            Some(p) => (p, &payload[3..]),
            None => (Priority::INFO, payload),
        };
        LogRecord {
            header: Some(Header { priority, name }),
            payload,
        }
    }

    /// A record produced by the relay itself rather than by the child.
    pub fn notice<'a>(&'a self, priority: Priority, text: &'a [u8]) -> LogRecord<'a> {
        LogRecord {
            header: Some(Header {
                priority,
                name: self.name.as_deref().unwrap_or(DEFAULT_NOTICE_NAME),
            }),
            payload: text,
        }
    }
}

/// Picks the name for `-P`: the last `/`-separated component of the program.
pub fn auto_name(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}
