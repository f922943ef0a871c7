use tabql_core::{AppError, FileInfo, View};

use crate::common::{cell_text, is_numeric, join_lines, require_non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gfm,
    Org,
}

fn escape_cell(text: &str, dialect: Dialect) -> String {
    let text = text.replace('\n', "<br />");
    match dialect {
        Dialect::Gfm => text.replace('|', "\\|"),
        Dialect::Org => text.replace('|', "\\vert{}"),
    }
}

fn row_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

pub fn encode(view: &View, info: &FileInfo, dialect: Dialect) -> Result<Vec<u8>, AppError> {
    require_non_empty(view.header.0.len(), &view.records)?;

    let names = view.header.names();
    let header_cells: Vec<String> = names.iter().map(|n| escape_cell(n, dialect)).collect();

    // Whether each column is entirely numeric determines the GFM
    // right-align marker.
    let numeric_cols: Vec<bool> = (0..names.len())
        .map(|i| view.records.iter().all(|r| is_numeric(&r[i])))
        .collect();

    let mut lines = Vec::new();
    lines.push(row_line(&header_cells));

    match dialect {
        Dialect::Gfm => {
            let seps: Vec<String> = numeric_cols
                .iter()
                .map(|&numeric| if numeric { "------:".to_string() } else { "---".to_string() })
                .collect();
            lines.push(row_line(&seps));
        }
        Dialect::Org => {
            let seps: Vec<String> = names.iter().map(|n| "-".repeat(n.len().max(3) + 2)).collect();
            lines.push(format!("+{}+", seps.join("+")));
        }
    }

    for record in &view.records {
        let cells: Vec<String> = record.iter().map(|v| escape_cell(&cell_text(v), dialect)).collect();
        lines.push(row_line(&cells));
    }

    Ok(join_lines(&lines, info.line_break).into_bytes())
}
