//! Workbooks (xls, xlsx, xlsm, ods) rendered sheet by sheet as HTML tables.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::warn;

use crate::model::preview::SheetTable;

use super::escape_html;

/// All sheets of a workbook plus the one selected for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWorkbook {
    pub sheets: Vec<SheetTable>,
    pub selected: usize,
}

/// Open a workbook from memory and render every sheet.
///
/// An out-of-range `selected` index falls back to sheet 0. `max_rows` limits
/// rows per sheet (0 = unlimited). A sheet that fails to load renders empty.
pub fn render_workbook(
    bytes: &[u8],
    selected: usize,
    max_rows: usize,
) -> Result<RenderedWorkbook, calamine::Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let html = match workbook.worksheet_range(&name) {
            Ok(range) => range_to_html(&range, max_rows),
            Err(e) => {
                warn!(sheet = %name, error = %e, "Could not read sheet");
                String::from("<table></table>")
            }
        };
        sheets.push(SheetTable { name, html });
    }

    let selected = if selected < sheets.len() { selected } else { 0 };
    Ok(RenderedWorkbook { sheets, selected })
}

fn range_to_html(range: &Range<Data>, max_rows: usize) -> String {
    let limit = if max_rows == 0 { usize::MAX } else { max_rows };
    let mut html = String::from("<table>\n");
    for row in range.rows().take(limit) {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell_to_string(cell))));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        _ => cell.to_string(),
    }
}
