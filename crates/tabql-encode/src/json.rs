use tabql_core::{AppError, FileInfo, JsonEscape, Ternary, Value, View};

use crate::common::require_non_empty;

fn escape_json_string(s: &str, mode: JsonEscape) -> String {
    let mut out = String::from('"');
    match mode {
        JsonEscape::Backslash | JsonEscape::HexDigits => {
            for c in s.chars() {
                match c {
                    '\\' if mode == JsonEscape::HexDigits => out.push_str("\\u005c"),
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                    c => out.push(c),
                }
            }
        }
        JsonEscape::AllWithHexDigits => {
            let mut buf = [0u16; 2];
            for c in s.chars() {
                for u in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{u:04x}"));
                }
            }
        }
    }
    out.push('"');
    out
}

/// Column names are encoded as JSON object paths: a dot-separated chain
/// of identifier segments, each optionally followed by a `[N]` array
/// index. Validates `name` against that grammar, reporting the first
/// unexpected token the way a path parser would.
fn validate_column_name(name: &str) -> Result<(), AppError> {
    fn err(name: &str, token: &str, column: usize) -> AppError {
        AppError::AppError(format!(
            "encoding to json failed: unexpected token \"{token}\" at column {column} in \"{name}\""
        ))
    }

    let is_structural = |c: char| matches!(c, '.' | '[' | ']');
    let chars: Vec<char> = name.chars().collect();
    let mut i = 0usize;

    loop {
        let segment_start = i;
        while i < chars.len() && !is_structural(chars[i]) {
            i += 1;
        }
        if i == segment_start {
            let token = chars.get(i).map(|c| c.to_string()).unwrap_or_default();
            return Err(err(name, &token, i + 1));
        }
        if i >= chars.len() {
            return Ok(());
        }
        match chars[i] {
            '.' => {
                i += 1;
                if i >= chars.len() {
                    return Err(err(name, "", i + 1));
                }
            }
            '[' => {
                i += 1;
                let index_start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i == index_start || chars.get(i) != Some(&']') {
                    let token = chars.get(i).map(|c| c.to_string()).unwrap_or_default();
                    return Err(err(name, &token, i + 1));
                }
                i += 1;
            }
            _ => return Err(err(name, "]", i + 1)),
        }
    }
}

fn encode_value(value: &Value, mode: JsonEscape) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => {
            if f.is_finite() { f.to_string() } else { "null".to_string() }
        }
        Value::Datetime(dt) => escape_json_string(&dt.to_rfc3339(), mode),
        Value::String(s) => escape_json_string(s, mode),
        Value::Ternary(Ternary::True) => "true".to_string(),
        Value::Ternary(Ternary::False) => "false".to_string(),
        Value::Ternary(Ternary::Unknown) => "null".to_string(),
    }
}

pub fn encode(view: &View, info: &FileInfo) -> Result<Vec<u8>, AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let names = view.header.names();
    for name in &names {
        validate_column_name(name)?;
    }
    let keys: Vec<String> = names.iter().map(|n| escape_json_string(n, info.json_escape)).collect();

    let mut out = String::new();
    if info.pretty_print {
        out.push_str("[\n");
        for (ri, record) in view.records.iter().enumerate() {
            out.push_str("  {\n");
            for (i, value) in record.iter().enumerate() {
                out.push_str("    ");
                out.push_str(&keys[i]);
                out.push_str(": ");
                out.push_str(&encode_value(value, info.json_escape));
                if i + 1 < record.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str("  }");
            if ri + 1 < view.records.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push(']');
    } else {
        out.push('[');
        for (ri, record) in view.records.iter().enumerate() {
            if ri > 0 {
                out.push(',');
            }
            out.push('{');
            for (i, value) in record.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&keys[i]);
                out.push(':');
                out.push_str(&encode_value(value, info.json_escape));
            }
            out.push('}');
        }
        out.push(']');
    }

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{Header, HeaderField};

    #[test]
    fn hex_digits_escape_replaces_only_backslash() {
        let header = Header(vec![HeaderField::new(None, "c1")]);
        let view = View::new(
            header,
            vec![
                vec![Value::String("a".into())],
                vec![Value::String("b".into())],
                vec![Value::String("abc\\def".into())],
            ],
            None,
        );
        let mut info = FileInfo::temporary("mem");
        info.json_escape = JsonEscape::HexDigits;
        let text = String::from_utf8(encode(&view, &info).unwrap()).unwrap();
        assert_eq!(text, "[{\"c1\":\"a\"},{\"c1\":\"b\"},{\"c1\":\"abc\\u005cdef\"}]");
    }

    #[test]
    fn column_name_with_a_stray_dot_is_rejected() {
        let header = Header(vec![HeaderField::new(None, "c1..")]);
        let view = View::new(
            header,
            vec![
                vec![Value::String("a".into())],
                vec![Value::String("b".into())],
                vec![Value::String("abc\\def".into())],
            ],
            None,
        );
        let mut info = FileInfo::temporary("mem");
        info.json_escape = JsonEscape::HexDigits;
        let err = encode(&view, &info).unwrap_err();
        assert_eq!(
            err.to_string(),
            "encoding to json failed: unexpected token \".\" at column 4 in \"c1..\""
        );
    }

    #[test]
    fn pretty_print_is_two_space_indented() {
        let header = Header(vec![HeaderField::new(None, "a")]);
        let view = View::new(header, vec![vec![Value::Integer(1)]], None);
        let mut info = FileInfo::temporary("mem");
        info.pretty_print = true;
        let text = String::from_utf8(encode(&view, &info).unwrap()).unwrap();
        assert_eq!(text, "[\n  {\n    \"a\": 1\n  }\n]");
    }
}
