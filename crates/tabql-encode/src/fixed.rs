use tabql_core::{AppError, FileInfo, View};
use unicode_width::UnicodeWidthStr;

use crate::common::{cell_text, is_numeric, join_lines, require_non_empty};

fn validate_positions(positions: &[i64]) -> Result<(), AppError> {
    let mut prev = 0i64;
    for &p in positions {
        if p <= prev {
            return Err(AppError::InvalidDelimiterPosition { positions: positions.to_vec() });
        }
        prev = p;
    }
    Ok(())
}

fn widths_from_positions(positions: &[i64]) -> Vec<usize> {
    let mut prev = 0i64;
    let mut widths = Vec::with_capacity(positions.len());
    for &p in positions {
        widths.push((p - prev) as usize);
        prev = p;
    }
    widths
}

fn pad_field(text: &str, width: usize, right_align: bool) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        return text.chars().take(width).collect();
    }
    let fill = " ".repeat(width - w);
    if right_align { format!("{fill}{text}") } else { format!("{text}{fill}") }
}

pub fn encode(view: &View, info: &FileInfo) -> Result<Vec<u8>, AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let widths = match &info.delimiter_positions {
        Some(positions) => {
            validate_positions(positions)?;
            widths_from_positions(positions)
        }
        None => {
            let mut widths = vec![0usize; view.header.0.len()];
            for (i, name) in view.header.names().iter().enumerate() {
                widths[i] = widths[i].max(UnicodeWidthStr::width(*name));
            }
            for record in &view.records {
                for (i, v) in record.iter().enumerate() {
                    widths[i] = widths[i].max(UnicodeWidthStr::width(cell_text(v).as_str()));
                }
            }
            widths
        }
    };

    let mut lines: Vec<String> = Vec::new();
    if !info.no_header {
        let mut line = String::new();
        for (i, name) in view.header.names().iter().enumerate() {
            line.push_str(&pad_field(name, widths[i], false));
        }
        lines.push(line);
    }
    for record in &view.records {
        let mut line = String::new();
        for (i, v) in record.iter().enumerate() {
            let text = cell_text(v);
            line.push_str(&pad_field(&text, widths[i], is_numeric(v)));
        }
        lines.push(line);
    }

    Ok(join_lines(&lines, info.line_break).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{Header, HeaderField, Value};

    #[test]
    fn rejects_non_monotone_positions() {
        let header = Header(vec![HeaderField::new(None, "a")]);
        let view = View::new(header, vec![vec![Value::Integer(1)]], None);
        let mut info = FileInfo::temporary("mem");
        info.delimiter_positions = Some(vec![10, 42, -1]);
        let err = encode(&view, &info).unwrap_err();
        assert_eq!(err.to_string(), "invalid delimiter position: [10, 42, -1]");
    }
}
