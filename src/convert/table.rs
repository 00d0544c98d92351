//! Markdown table handling.
//!
//! Pipe-delimited rows are collected by the block state machine and emitted
//! as a single `#tabella-geko(...)` call. Cell content goes through a
//! restricted inline pass: bold uses the bracket form `#strong[...]` instead
//! of `*...*` so it cannot collide with the table construct's delimiters,
//! and list/link/heading rules do not apply inside cells.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::convert::inline::rewrite_italic;

/// Row shape. Deliberately permissive: anything with a `|` after the first
/// character counts, so tables pasted without leading pipes still convert.
static ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|?.+\|").unwrap());

/// Separator row between header and data (`|---|:---:|`).
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|?[\s\-:|]+\|").unwrap());

/// Bold span inside a cell.
static CELL_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

/// Whether a trimmed line has the shape of a table row.
pub(crate) fn is_row(trimmed: &str) -> bool {
    trimmed.contains('|') && ROW.is_match(trimmed)
}

/// Whether a trimmed line is a header/data separator row.
pub(crate) fn is_separator(trimmed: &str) -> bool {
    SEPARATOR.is_match(trimmed)
}

/// Split a trimmed row into cells: outer pipes stripped, cells trimmed,
/// empties dropped. Cell counts are not validated against the header.
pub(crate) fn split_cells(trimmed: &str) -> Vec<String> {
    trimmed
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render header and data rows as a `#tabella-geko(...)` call.
pub(crate) fn format(headers: &[String], rows: &[Vec<String>]) -> String {
    let header_cells = headers
        .iter()
        .map(|h| format!("[{}]", rewrite_cell(h)))
        .collect::<Vec<_>>()
        .join(", ");

    let row_tuples = rows
        .iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(|c| format!("[{}]", rewrite_cell(c)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("    ({cells}),")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("#tabella-geko(\n  ({header_cells},),\n  (\n{row_tuples}\n  )\n)")
}

/// Restricted inline pass for cell content: bracket-form bold plus italic.
fn rewrite_cell(text: &str) -> String {
    let text = CELL_BOLD.replace_all(text, "#strong[${1}]").into_owned();
    rewrite_italic(&text)
}
