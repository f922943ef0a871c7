use tabql_core::{AppError, FileInfo, View};

use crate::common::{cell_text, join_lines, require_non_empty};

fn validate_label(label: &str) -> Result<(), AppError> {
    for c in label.chars() {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-') {
            return Err(AppError::UnpermittedCharacter { context: "label", code: c as u32 });
        }
    }
    Ok(())
}

fn validate_field_value(value: &str) -> Result<(), AppError> {
    for c in value.chars() {
        if c == '\t' || c == '\r' || c == '\n' {
            return Err(AppError::UnpermittedCharacter { context: "field-value", code: c as u32 });
        }
    }
    Ok(())
}

pub fn encode(view: &View, info: &FileInfo) -> Result<Vec<u8>, AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let names = view.header.names();
    for name in &names {
        validate_label(name)?;
    }

    let mut lines = Vec::with_capacity(view.records.len());
    for record in &view.records {
        let mut fields = Vec::with_capacity(record.len());
        for (i, value) in record.iter().enumerate() {
            let text = cell_text(value);
            validate_field_value(&text)?;
            fields.push(format!("{}:{}", names[i], text));
        }
        lines.push(fields.join("\t"));
    }

    Ok(join_lines(&lines, info.line_break).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{Header, HeaderField, Value};

    #[test]
    fn encodes_label_value_pairs() {
        let header = Header(vec![
            HeaderField::new(None, "c1"),
            HeaderField::new(None, "c2"),
            HeaderField::new(None, "c3"),
        ]);
        let view = View::new(
            header,
            vec![
                vec![Value::Integer(-1), Value::Boolean(false), Value::Boolean(true)],
                vec![Value::String("2.0123".into()), Value::String("2016-02-01T16:00:00.123456-07:00".into()), Value::String("abcdef".into())],
            ],
            None,
        );
        let info = FileInfo::temporary("mem");
        let text = String::from_utf8(encode(&view, &info).unwrap()).unwrap();
        assert_eq!(
            text,
            "c1:-1\tc2:false\tc3:true\nc1:2.0123\tc2:2016-02-01T16:00:00.123456-07:00\tc3:abcdef"
        );
    }

    #[test]
    fn rejects_colon_in_label() {
        let header = Header(vec![HeaderField::new(None, "c1:")]);
        let view = View::new(header, vec![vec![Value::Integer(1)]], None);
        let info = FileInfo::temporary("mem");
        let err = encode(&view, &info).unwrap_err();
        assert_eq!(err.to_string(), "unpermitted character in label: U+003A");
    }
}
