//! UI Rendering
//!
//! Main layout and rendering logic for the TUI.

use crate::session::SessionState;
use crate::tui::app::{App, Mode};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use crate::view::FunctionPanel;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let content = if app.view.sidebar_open {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(40)])
            .split(frame.area());
        widgets::render_sidebar(frame, columns[0], app);
        columns[1]
    } else {
        frame.area()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(4),  // Session progress
            Constraint::Length(3),  // Function selector
            Constraint::Min(10),    // Panel content
            Constraint::Length(1),  // Status bar
        ])
        .split(content);

    render_header(frame, chunks[0], app);
    widgets::render_progress(frame, chunks[1], app.orchestrator.state());
    render_function_selector(frame, chunks[2], app);
    render_panel(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    if app.mode == Mode::PickingFile {
        render_file_prompt(frame, app);
    }
    if app.show_help {
        render_help(frame);
    }
}

/// Header with the key status indicator
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let key_dot = if app.params.api_key_valid() {
        Span::styled("●", Theme::success())
    } else {
        Span::styled("●", Theme::error())
    };

    let title_text = vec![Line::from(vec![
        Span::styled("Tablesum", Theme::title()),
        Span::styled(" — CSV Summarizing Agent", Theme::text_secondary()),
        Span::raw("  "),
        key_dot,
    ])];

    let title = Paragraph::new(title_text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

fn render_function_selector(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (i, panel) in FunctionPanel::ALL.iter().enumerate() {
        let selected = *panel == app.view.selected();
        spans.push(Span::styled(
            format!("[{}]", i + 1),
            Theme::shortcut_key(),
        ));
        spans.push(Span::styled(
            format!(" {} ", panel.label()),
            if selected { Theme::selected() } else { Theme::text_secondary() },
        ));
        if selected {
            spans.push(Span::styled(format!("{} ", Icons::COMPLETE), Theme::selected()));
        }
        spans.push(Span::raw("  "));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Functionality ")
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    frame.render_widget(paragraph, area);
}

fn render_panel(frame: &mut Frame, area: Rect, app: &App) {
    match app.view.selected() {
        FunctionPanel::Home => render_home(frame, area),
        FunctionPanel::Summarize | FunctionPanel::Analyze => render_upload_surface(frame, area, app),
    }
}

fn render_home(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Getting Started", Theme::heading())),
        Line::from(""),
        Line::from(vec![
            Span::styled("1. ", Theme::shortcut_key()),
            Span::styled(
                "Summarize CSV — get quick insights about your dataset",
                Theme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("2. ", Theme::shortcut_key()),
            Span::styled("Analyze CSV — deep dive into your data patterns", Theme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Pick a functionality with [2] or [3], then press Ctrl+O to choose a file.",
            Theme::text_secondary(),
        )),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Home ")
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    frame.render_widget(paragraph, area);
}

fn render_upload_surface(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.orchestrator.state();

    // split for the preview table only once a table exists
    let (summary_area, preview_area) = if state.table().is_some() {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Percentage(55)])
            .split(area);
        (halves[0], Some(halves[1]))
    } else {
        (area, None)
    };

    let mut lines = Vec::new();
    match state {
        SessionState::Idle => {
            lines.push(Line::from(Span::styled(
                "Upload your CSV file",
                Theme::heading(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Press Ctrl+O and enter a file path to upload and summarize.",
                Theme::text_secondary(),
            )));
        }
        SessionState::Uploading => {
            lines.push(Line::from(Span::styled(
                "Uploading and summarizing...",
                Theme::active(),
            )));
        }
        SessionState::Summarizing { .. } => {
            lines.push(Line::from(Span::styled(
                "Uploading and summarizing...",
                Theme::active(),
            )));
        }
        SessionState::Ready { summary, .. } => {
            lines.push(Line::from(Span::styled("Summary:", Theme::heading())));
            lines.push(Line::from(""));
            for text_line in summary.lines() {
                lines.push(Line::from(Span::styled(
                    text_line.to_string(),
                    Theme::text(),
                )));
            }
        }
        SessionState::Failed { .. } => {
            // no error banner; the preview (if any) stays and the status bar
            // carries the failure
            lines.push(Line::from(Span::styled(
                "No summary available.",
                Theme::text_dim(),
            )));
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {} ", app.view.selected().label()))
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    frame.render_widget(paragraph, summary_area);

    if let (Some(preview_area), Some(table)) = (preview_area, state.table()) {
        widgets::render_preview(frame, preview_area, table, app.preview_scroll);
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if let Some(note) = &app.status_note {
        Span::styled(note.clone(), Theme::warning())
    } else {
        match app.orchestrator.state() {
            SessionState::Idle => Span::styled("Ready", Theme::text_secondary()),
            SessionState::Uploading => {
                Span::styled(busy_label("Uploading", app), Theme::active())
            }
            SessionState::Summarizing { .. } => {
                Span::styled(busy_label("Summarizing", app), Theme::active())
            }
            SessionState::Ready { .. } => Span::styled("Summary ready", Theme::complete()),
            SessionState::Failed { .. } => Span::styled("Failed", Theme::error()),
        }
    };

    let shortcuts = vec![
        Span::styled(" [Ctrl+O]", Theme::shortcut_key()),
        Span::styled(" Open ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+B]", Theme::shortcut_key()),
        Span::styled(" Sidebar ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

fn busy_label(phase: &str, app: &App) -> String {
    match app.orchestrator.started_at() {
        Some(at) => format!("{}... (since {})", phase, at.format("%H:%M:%S")),
        None => format!("{}...", phase),
    }
}

/// Render the file path prompt
fn render_file_prompt(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Choose File ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Path to a CSV file:",
            Theme::text(),
        ))),
        chunks[0],
    );
    frame.render_widget(&app.path_input, chunks[1]);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Enter]", Theme::shortcut_key()),
            Span::styled(" Upload ", Theme::shortcut_desc()),
            Span::styled("[Esc]", Theme::shortcut_key()),
            Span::styled(" Cancel", Theme::shortcut_desc()),
        ])),
        chunks[2],
    );
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        Line::from(vec![
            Span::styled("1 / 2 / 3    ", Theme::shortcut_key()),
            Span::styled("Select functionality panel", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+O       ", Theme::shortcut_key()),
            Span::styled("Choose a CSV file", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Tab          ", Theme::shortcut_key()),
            Span::styled("Next sidebar field", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("←/→          ", Theme::shortcut_key()),
            Span::styled("Adjust the selected field", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("e / Enter    ", Theme::shortcut_key()),
            Span::styled("Edit the API key field", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+R       ", Theme::shortcut_key()),
            Span::styled("Restore default parameters", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+B       ", Theme::shortcut_key()),
            Span::styled("Collapse/expand the sidebar", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("↑/↓          ", Theme::shortcut_key()),
            Span::styled("Scroll the preview", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+Q       ", Theme::shortcut_key()),
            Span::styled("Quit", Theme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press Esc to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
