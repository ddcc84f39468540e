//! Preview Table
//!
//! Pure projection of the upload-phase table into a row-major grid. Every row
//! renders one cell per column, in column order, whatever shape the source
//! row has: a missing key or a JSON null shows the placeholder marker.

use crate::backend::PreviewRow;
use crate::session::TablePreview;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};
use serde_json::Value;

/// Placeholder for cells the source row does not supply.
pub const MISSING_CELL: &str = "—";

/// Text for one cell. Strings render verbatim (unquoted); other JSON values
/// keep their literal form.
pub fn cell_text(row: &PreviewRow, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => MISSING_CELL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Project rows onto the column list: a complete, rectangular cell grid.
pub fn project_rows(columns: &[String], rows: &[PreviewRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| columns.iter().map(|column| cell_text(row, column)).collect())
        .collect()
}

/// Render the preview table with a scroll offset into the rows.
pub fn render_preview(frame: &mut Frame, area: Rect, table: &TablePreview, scroll: usize) {
    let block = Block::default()
        .title(format!(" Preview — {} ({} rows) ", table.filename, table.row_count))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let header = Row::new(table.columns.clone()).style(Theme::heading());
    let rows = project_rows(&table.columns, &table.rows)
        .into_iter()
        .map(Row::new);
    let widths = std::iter::repeat(Constraint::Fill(1)).take(table.columns.len().max(1));

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .style(Theme::text());

    let offset = scroll.min(table.rows.len().saturating_sub(1));
    let mut state = TableState::default().with_offset(offset);
    frame.render_stateful_widget(widget, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> PreviewRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn present_cells_render_their_values() {
        let r = row(r#"{"name": "A", "age": 30, "score": 1.5}"#);
        assert_eq!(cell_text(&r, "name"), "A");
        assert_eq!(cell_text(&r, "age"), "30");
        assert_eq!(cell_text(&r, "score"), "1.5");
    }

    #[test]
    fn missing_and_null_cells_render_the_placeholder() {
        let r = row(r#"{"name": "A", "age": null}"#);
        assert_eq!(cell_text(&r, "age"), MISSING_CELL);
        assert_eq!(cell_text(&r, "city"), MISSING_CELL);
    }

    #[test]
    fn projection_is_rectangular_whatever_the_row_shape() {
        let columns = vec!["name".to_string(), "age".to_string(), "city".to_string()];
        let rows = vec![
            row(r#"{"name": "A", "age": 30, "city": "Oslo"}"#),
            row(r#"{"name": "B"}"#),
            row(r#"{"age": 25, "extra": "ignored"}"#),
        ];

        let grid = project_rows(&columns, &rows);

        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|cells| cells.len() == columns.len()));
        assert_eq!(grid[0], vec!["A", "30", "Oslo"]);
        assert_eq!(grid[1], vec!["B", MISSING_CELL, MISSING_CELL]);
        assert_eq!(grid[2], vec![MISSING_CELL, "25", MISSING_CELL]);
    }

    #[test]
    fn complete_data_needs_no_placeholders() {
        let columns = vec!["name".to_string(), "age".to_string()];
        let rows = vec![
            row(r#"{"name": "A", "age": 30}"#),
            row(r#"{"name": "B", "age": 25}"#),
            row(r#"{"name": "C", "age": 40}"#),
        ];

        let grid = project_rows(&columns, &rows);
        assert!(grid.iter().flatten().all(|cell| cell != MISSING_CELL));
    }
}
