use tabql_core::{FileInfo, View};
use unicode_width::UnicodeWidthStr;

use crate::common::{cell_class, cell_text, is_numeric, join_lines, require_non_empty, CellClass};

fn color_for(class: CellClass) -> Option<anstyle::Style> {
    use anstyle::{AnsiColor, Style};
    Some(match class {
        CellClass::Number => Style::new().fg_color(Some(AnsiColor::Magenta.into())),
        CellClass::StringVal => Style::new().fg_color(Some(AnsiColor::Green.into())),
        CellClass::BooleanVal => Style::new().fg_color(Some(AnsiColor::Yellow.into())),
        CellClass::DatetimeVal => Style::new().fg_color(Some(AnsiColor::Cyan.into())),
        CellClass::NullVal => Style::new().fg_color(Some(AnsiColor::BrightBlack.into())),
    })
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let w = UnicodeWidthStr::width(text);
    let fill = width.saturating_sub(w);
    if right_align {
        format!("{}{}", " ".repeat(fill), text)
    } else {
        format!("{}{}", text, " ".repeat(fill))
    }
}

fn border(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s
}

pub fn encode(view: &View, info: &FileInfo, color: bool) -> Result<Vec<u8>, tabql_core::AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let names = view.header.names();
    let header_lines: Vec<Vec<&str>> = names.iter().map(|n| n.split('\n').collect()).collect();
    let row_cell_lines: Vec<Vec<Vec<String>>> = view
        .records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|v| cell_text(v).split('\n').map(|s| s.to_string()).collect())
                .collect()
        })
        .collect();

    let mut widths = vec![0usize; names.len()];
    for (i, lines) in header_lines.iter().enumerate() {
        for l in lines {
            widths[i] = widths[i].max(UnicodeWidthStr::width(*l));
        }
    }
    for row in &row_cell_lines {
        for (i, lines) in row.iter().enumerate() {
            for l in lines {
                widths[i] = widths[i].max(UnicodeWidthStr::width(l.as_str()));
            }
        }
    }

    let mut out_lines: Vec<String> = Vec::new();
    let border_line = border(&widths);
    out_lines.push(border_line.clone());

    let header_row_height = header_lines.iter().map(|l| l.len()).max().unwrap_or(1);
    for r in 0..header_row_height {
        let mut line = String::from("|");
        for (i, lines) in header_lines.iter().enumerate() {
            let text = lines.get(r).copied().unwrap_or("");
            line.push(' ');
            line.push_str(&pad(text, widths[i], false));
            line.push_str(" |");
        }
        out_lines.push(line);
    }
    out_lines.push(border_line.clone());

    for (record, row) in view.records.iter().zip(row_cell_lines.iter()) {
        let row_height = row.iter().map(|c| c.len()).max().unwrap_or(1);
        for r in 0..row_height {
            let mut line = String::from("|");
            for (i, cell_sublines) in row.iter().enumerate() {
                let text = cell_sublines.get(r).map(String::as_str).unwrap_or("");
                let value = &record[i];
                let right_align = is_numeric(value);
                let padded = pad(text, widths[i], right_align);
                line.push(' ');
                if color {
                    if let Some(style) = color_for(cell_class(value)) {
                        line.push_str(&format!("{style}{padded}{style:#}"));
                    } else {
                        line.push_str(&padded);
                    }
                } else {
                    line.push_str(&padded);
                }
                line.push_str(" |");
            }
            out_lines.push(line);
        }
    }
    out_lines.push(border_line);

    Ok(join_lines(&out_lines, info.line_break).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{FileInfo, Header, HeaderField, Value, View};

    #[test]
    fn grid_has_borders_and_right_aligned_numbers() {
        let header = Header(vec![
            HeaderField::new(None, "a"),
            HeaderField::new(None, "b"),
            HeaderField::new(None, "c"),
        ]);
        let view = View::new(
            header,
            vec![vec![Value::Integer(-1), Value::Ternary(tabql_core::Ternary::Unknown), Value::Boolean(true)]],
            None,
        );
        let info = FileInfo::temporary("mem");
        let bytes = encode(&view, &info, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with('+'));
        assert!(text.contains("-1"));
        assert!(text.contains("UNKNOWN"));
        assert!(text.contains("true"));
    }

    #[test]
    fn empty_result_set_is_rejected() {
        let header = Header(vec![HeaderField::new(None, "a")]);
        let view = View::new(header, vec![], None);
        let info = FileInfo::temporary("mem");
        assert!(encode(&view, &info, false).is_err());
    }
}
