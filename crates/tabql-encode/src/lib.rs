//! Serializes a [`View`] to bytes in one of tabql's eight output formats
//!. Each format module handles its own line/quote/escape
//! rules; this module owns the final UTF-8 -> `encoding` transcode shared
//! by every format.

mod common;
mod delimited;
mod fixed;
mod json;
mod ltsv;
mod markdown;
mod text;

use tabql_core::{AppError, FileInfo, Format, View};

pub use common::{cell_class, CellClass};
pub use markdown::Dialect as MarkdownDialect;

/// Encodes `view` per `info.format`, honoring `color` only for TEXT.
/// Encoding the same View with the same FileInfo twice yields byte
/// identical output — nothing here carries state
/// across calls.
pub fn encode(view: &View, info: &FileInfo, color: bool) -> Result<Vec<u8>, AppError> {
    let utf8 = match info.format {
        Format::Text => text::encode(view, info, color)?,
        Format::Fixed => fixed::encode(view, info)?,
        Format::Csv | Format::Tsv => delimited::encode(view, info)?,
        Format::Gfm => markdown::encode(view, info, MarkdownDialect::Gfm)?,
        Format::Org => markdown::encode(view, info, MarkdownDialect::Org)?,
        Format::Json => json::encode(view, info)?,
        Format::Ltsv => ltsv::encode(view, info)?,
    };
    let text = String::from_utf8(utf8).expect("format encoders only emit valid UTF-8");
    Ok(common::transcode(&text, info.encoding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{Header, HeaderField, Value};

    #[test]
    fn encoding_is_deterministic() {
        let header = Header(vec![HeaderField::new(None, "a")]);
        let view = View::new(header, vec![vec![Value::Integer(1)]], None);
        let info = FileInfo::temporary("mem");
        let once = encode(&view, &info, false).unwrap();
        let twice = encode(&view, &info, false).unwrap();
        assert_eq!(once, twice);
    }
}
