//! Progress Widget
//!
//! Displays the session phases: Upload → Summarize → Done.

use crate::session::SessionState;
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the session progress indicator
pub fn render_progress(frame: &mut Frame, area: Rect, state: &SessionState) {
    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();

    match state.table() {
        Some(table) => {
            lines.push(Line::from(vec![
                Span::styled("File: ", Theme::text_secondary()),
                Span::styled(
                    format!("{} ({} rows)", table.filename, table.row_count),
                    Theme::text(),
                ),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Waiting for a file...",
                Theme::text_dim(),
            )));
        }
    }

    lines.push(Line::from(build_progress_line(state)));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn build_progress_line(state: &SessionState) -> Vec<Span<'static>> {
    let stages = [
        ("Upload", StageState::from_upload(state)),
        ("Summarize", StageState::from_summarize(state)),
        ("Done", StageState::from_done(state)),
    ];

    let mut spans = Vec::new();

    for (i, (name, stage)) in stages.iter().enumerate() {
        let (icon, style) = match stage {
            StageState::Complete => (Icons::COMPLETE, Theme::complete()),
            StageState::Active => (Icons::ACTIVE, Theme::active()),
            StageState::Pending => (Icons::PENDING, Theme::pending()),
            StageState::Error => (Icons::ERROR, Theme::error()),
        };

        spans.push(Span::styled(format!("{} ", icon), style));
        spans.push(Span::styled(name.to_string(), style));

        if i < stages.len() - 1 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
    }

    spans
}

/// State of one phase marker
#[derive(Debug, Clone, Copy, PartialEq)]
enum StageState {
    Pending,
    Active,
    Complete,
    Error,
}

impl StageState {
    fn from_upload(state: &SessionState) -> Self {
        match state {
            SessionState::Idle => StageState::Pending,
            SessionState::Uploading => StageState::Active,
            // an upload-phase failure left no table behind
            SessionState::Failed { table: None, .. } => StageState::Error,
            _ => StageState::Complete,
        }
    }

    fn from_summarize(state: &SessionState) -> Self {
        match state {
            SessionState::Idle | SessionState::Uploading => StageState::Pending,
            SessionState::Summarizing { .. } => StageState::Active,
            SessionState::Failed { .. } => StageState::Error,
            SessionState::Ready { .. } => StageState::Complete,
        }
    }

    fn from_done(state: &SessionState) -> Self {
        match state {
            SessionState::Ready { .. } => StageState::Complete,
            SessionState::Failed { .. } => StageState::Error,
            _ => StageState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TablePreview;

    fn table() -> TablePreview {
        TablePreview {
            filename: "data.csv".to_string(),
            row_count: 3,
            columns: vec!["name".to_string()],
            rows: Vec::new(),
        }
    }

    #[test]
    fn upload_marker_follows_the_session() {
        assert_eq!(StageState::from_upload(&SessionState::Idle), StageState::Pending);
        assert_eq!(
            StageState::from_upload(&SessionState::Uploading),
            StageState::Active
        );
        assert_eq!(
            StageState::from_upload(&SessionState::Summarizing { table: table() }),
            StageState::Complete
        );
        assert_eq!(
            StageState::from_upload(&SessionState::Failed {
                table: None,
                error: "x".to_string()
            }),
            StageState::Error
        );
        // summarize-phase failure: the upload itself completed
        assert_eq!(
            StageState::from_upload(&SessionState::Failed {
                table: Some(table()),
                error: "x".to_string()
            }),
            StageState::Complete
        );
    }

    #[test]
    fn done_marker_only_lights_on_ready() {
        assert_eq!(
            StageState::from_done(&SessionState::Ready {
                table: table(),
                summary: "ok".to_string()
            }),
            StageState::Complete
        );
        assert_eq!(
            StageState::from_done(&SessionState::Summarizing { table: table() }),
            StageState::Pending
        );
    }
}
