//! Naive CSV/TSV splitting.
//!
//! Lines are split on the delimiter without quote awareness: a quoted field
//! containing the delimiter is split in two. Wrapping quotes are stripped.

use crate::model::preview::Table;

use super::escape_html;

/// Parse delimited text. Row 0 is the header; blank lines are skipped.
///
/// `max_rows` limits the data rows kept (0 = unlimited).
pub fn parse_delimited(text: &str, delimiter: char, max_rows: usize) -> Table {
    let mut lines = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = lines.next().map(|l| split_row(l, delimiter)).unwrap_or_default();
    let rows = lines.map(|l| split_row(l, delimiter));
    let rows: Vec<Vec<String>> = if max_rows == 0 {
        rows.collect()
    } else {
        rows.take(max_rows).collect()
    };
    Table { header, rows }
}

/// Delimiter for a lowercased extension: tab for `tsv`, comma otherwise.
pub fn delimiter_for(extension: &str) -> char {
    if extension == "tsv" {
        '\t'
    } else {
        ','
    }
}

fn split_row(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(strip_quotes).collect()
}

fn strip_quotes(field: &str) -> String {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
        .to_string()
}

/// Render a table as HTML with a `<thead>` for the header row.
pub fn table_to_html(table: &Table) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for cell in &table.header {
        html.push_str(&format!("<th>{}</th>", escape_html(cell)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}
