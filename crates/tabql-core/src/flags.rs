use crate::view::{Encoding, Format, JsonEscape, LineBreak};
use std::time::Duration;

/// CLI-visible configuration read by the Encoder and Transaction Manager
///. Design note §9 warns against process globals for
/// session-scoped state; this is carried as a field of the interpreter's
/// `Session`, not a `static`.
#[derive(Debug, Clone)]
pub struct Flags {
    pub format: Format,
    pub delimiter: char,
    pub write_delimiter: char,
    pub write_encoding: Encoding,
    pub line_break: LineBreak,
    pub without_header: bool,
    pub enclose_all: bool,
    pub json_escape: JsonEscape,
    pub pretty_print: bool,
    pub color: bool,
    pub out_file: Option<String>,
    pub lock_retry_interval: Duration,
    pub lock_timeout: Duration,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            format: Format::Csv,
            delimiter: ',',
            write_delimiter: ',',
            write_encoding: Encoding::Utf8,
            // Default line-break when no OutFile is LF; with OutFile the
            // configured one is used — the CLI layer overrides
            // this field once `out_file` is known.
            line_break: LineBreak::Lf,
            without_header: false,
            enclose_all: false,
            json_escape: JsonEscape::Backslash,
            pretty_print: false,
            color: false,
            out_file: None,
            lock_retry_interval: Duration::from_millis(50),
            lock_timeout: Duration::from_secs(10),
        }
    }
}
