use tabql_core::{AppError, FileInfo, View};

use crate::common::{cell_text, join_lines, require_non_empty};

/// RFC 4180 field quoting: quote only when necessary, unless `enclose_all`
/// forces every field, doubling embedded quotes.
fn quote_field(field: &str, delimiter: char, enclose_all: bool, line_break: &str) -> String {
    let needs_quote = enclose_all
        || field.contains(delimiter)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field.contains(line_break);
    if !needs_quote {
        return field.to_string();
    }
    let escaped = field.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

pub fn encode(view: &View, info: &FileInfo) -> Result<Vec<u8>, AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let line_break = info.line_break.as_str();
    let mut lines: Vec<String> = Vec::new();

    if !info.no_header {
        let header_fields: Vec<String> = view
            .header
            .names()
            .iter()
            .map(|n| quote_field(n, info.delimiter, info.enclose_all, line_break))
            .collect();
        lines.push(header_fields.join(&info.delimiter.to_string()));
    }

    for record in &view.records {
        let fields: Vec<String> = record
            .iter()
            .map(|v| quote_field(&cell_text(v), info.delimiter, info.enclose_all, line_break))
            .collect();
        lines.push(fields.join(&info.delimiter.to_string()));
    }

    Ok(join_lines(&lines, info.line_break).into_bytes())
}
