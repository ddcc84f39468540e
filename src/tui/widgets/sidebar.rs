//! Parameters Sidebar
//!
//! Collapsible panel holding the API key field, the model selector and the
//! sampling sliders. Tab cycles the selected field; Left/Right adjust it.

use crate::params::Parameters;
use crate::tui::app::{App, Mode, SidebarField};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SLIDER_SEGMENTS: usize = 10;

/// Render the sidebar panel
pub fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Parameters ")
        .borders(Borders::ALL)
        .border_style(if app.mode == Mode::EditingKey {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // API key
            Constraint::Length(2), // Model
            Constraint::Length(2), // Temperature
            Constraint::Length(2), // Top P
            Constraint::Min(0),    // Hints
        ])
        .split(inner);

    render_api_key(frame, chunks[0], app);
    render_model(frame, chunks[1], app);
    render_slider(
        frame,
        chunks[2],
        "Temperature",
        app.params.temperature(),
        is_selected(app, SidebarField::Temperature),
    );
    render_slider(
        frame,
        chunks[3],
        "Top P",
        app.params.top_p(),
        is_selected(app, SidebarField::TopP),
    );
    render_hints(frame, chunks[4]);
}

fn is_selected(app: &App, field: SidebarField) -> bool {
    app.sidebar_field() == field
}

fn field_label(selected: bool, name: &str) -> Line<'static> {
    let prefix = if selected { Icons::SELECTED } else { " " };
    Line::from(vec![
        Span::styled(
            format!("{} ", prefix),
            if selected {
                Theme::selected()
            } else {
                Theme::text_dim()
            },
        ),
        Span::styled(
            name.to_string(),
            if selected {
                Theme::selected()
            } else {
                Theme::text()
            },
        ),
    ])
}

fn render_api_key(frame: &mut Frame, area: Rect, app: &App) {
    let selected = is_selected(app, SidebarField::ApiKey);
    let label = field_label(selected, "API key");
    frame.render_widget(Paragraph::new(vec![label]), Rect { height: 1, ..area });

    let value_area = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        x: area.x + 2,
        width: area.width.saturating_sub(2),
    };

    if app.mode == Mode::EditingKey {
        frame.render_widget(&app.key_input, value_area);
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        key_hint(&app.params),
        Theme::text_dim(),
    ))];
    if app.params.api_key_valid() {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", Icons::COMPLETE), Theme::success()),
            Span::styled("API key loaded", Theme::success()),
        ]));
    } else if selected {
        lines.push(Line::from(Span::styled(
            "[e] to enter a key",
            Theme::text_dim(),
        )));
    }
    frame.render_widget(Paragraph::new(lines), value_area);
}

/// Masked display: only the last four characters of a configured key show.
fn key_hint(params: &Parameters) -> String {
    let key = params.api_key();
    if key.is_empty() {
        "not set".to_string()
    } else {
        format!("••••{}", &key[key.len().saturating_sub(4)..])
    }
}

fn render_model(frame: &mut Frame, area: Rect, app: &App) {
    let selected = is_selected(app, SidebarField::Model);
    let lines = vec![
        field_label(selected, "Model"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("‹ ", Theme::text_dim()),
            Span::styled(
                app.params.model().label().to_string(),
                if selected { Theme::selected() } else { Theme::text() },
            ),
            Span::styled(" ›", Theme::text_dim()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_slider(frame: &mut Frame, area: Rect, name: &str, value: f32, selected: bool) {
    let lines = vec![
        field_label(selected, &format!("{name}: {value}")),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                slider_track(value),
                if selected { Theme::selected() } else { Theme::text_dim() },
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn slider_track(value: f32) -> String {
    let filled = ((value * SLIDER_SEGMENTS as f32).round() as usize).min(SLIDER_SEGMENTS);
    format!(
        "{}{}",
        Icons::SLIDER_FILLED.repeat(filled),
        Icons::SLIDER_EMPTY.repeat(SLIDER_SEGMENTS - filled)
    )
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("[Tab]", Theme::shortcut_key()),
            Span::styled(" Field ", Theme::shortcut_desc()),
            Span::styled("[←/→]", Theme::shortcut_key()),
            Span::styled(" Adjust", Theme::shortcut_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Ctrl+R]", Theme::shortcut_key()),
            Span::styled(" Default setting", Theme::shortcut_desc()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
