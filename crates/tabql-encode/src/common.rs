use tabql_core::{AppError, Encoding, LineBreak, Record, Value};

/// Joins lines with the configured terminator; the last line never gets
/// one.
pub fn join_lines(lines: &[String], line_break: LineBreak) -> String {
    lines.join(line_break.as_str())
}

/// Transcodes the final UTF-8 buffer into the configured output encoding
///.
pub fn transcode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf8Bom => {
            let mut out = vec![0xEF, 0xBB, 0xBF];
            out.extend_from_slice(text.as_bytes());
            out
        }
        Encoding::Sjis => {
            let (cow, _, _) = encoding_rs::SHIFT_JIS.encode(text);
            cow.into_owned()
        }
    }
}

/// How a scalar renders as a grid/delimited cell and which color class it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Number,
    StringVal,
    BooleanVal,
    DatetimeVal,
    NullVal,
}

pub fn cell_class(value: &Value) -> CellClass {
    match value {
        Value::Null => CellClass::NullVal,
        Value::Integer(_) | Value::Float(_) => CellClass::Number,
        Value::Boolean(_) | Value::Ternary(_) => CellClass::BooleanVal,
        Value::Datetime(_) => CellClass::DatetimeVal,
        Value::String(_) => CellClass::StringVal,
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Float(_))
}

pub fn require_non_empty(header_len: usize, records: &[Record]) -> Result<(), AppError> {
    if header_len == 0 || records.is_empty() {
        return Err(AppError::EmptyResultSet);
    }
    Ok(())
}
