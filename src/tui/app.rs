//! Application State
//!
//! Central state for the TUI: the parameter store, the view-state controller
//! and the upload orchestrator, plus the input focus bookkeeping that glues
//! them to the keyboard.

use crate::backend::{BackendApi, HttpBackend, SourceFile};
use crate::config::Config;
use crate::params::{self, Parameters};
use crate::session::Orchestrator;
use crate::tui::event::AppAction;
use crate::types::{AppError, AppResult};
use crate::view::{FilePreferenceStore, FunctionPanel, PreferenceStore, ViewState};
use bytes::Bytes;
use crossterm::event::KeyCode;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use tui_textarea::TextArea;

/// Input focus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into the masked API key field
    EditingKey,
    /// Typing a file path into the picker prompt
    PickingFile,
}

/// Editable sidebar fields, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarField {
    ApiKey,
    Model,
    Temperature,
    TopP,
}

pub const SIDEBAR_FIELDS: [SidebarField; 4] = [
    SidebarField::ApiKey,
    SidebarField::Model,
    SidebarField::Temperature,
    SidebarField::TopP,
];

/// Main application state
pub struct App {
    pub config: Config,
    pub params: Parameters,
    pub view: ViewState,
    pub orchestrator: Orchestrator,

    pub mode: Mode,
    pub sidebar_index: usize,
    pub key_input: TextArea<'static>,
    pub path_input: TextArea<'static>,
    pub preview_scroll: usize,
    pub status_note: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    /// Create the production application instance
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::new());
        let backend: Arc<dyn BackendApi> =
            Arc::new(HttpBackend::new(config.backend.base_url.clone()));
        Self::with_parts(config, store, backend)
    }

    /// Wire the app from explicit collaborators (tests use in-memory ones)
    pub fn with_parts(
        config: Config,
        store: Arc<dyn PreferenceStore>,
        backend: Arc<dyn BackendApi>,
    ) -> Self {
        let mut key_input = TextArea::default();
        key_input.set_cursor_line_style(ratatui::style::Style::default());
        key_input.set_placeholder_text("sk-...");
        key_input.set_mask_char('•');

        let mut path_input = TextArea::default();
        path_input.set_cursor_line_style(ratatui::style::Style::default());
        path_input.set_placeholder_text("path/to/data.csv");

        Self {
            config,
            params: Parameters::default(),
            view: ViewState::load(store),
            orchestrator: Orchestrator::new(backend),
            mode: Mode::default(),
            sidebar_index: 0,
            key_input,
            path_input,
            preview_scroll: 0,
            status_note: None,
            show_help: false,
            should_quit: false,
        }
    }

    pub fn sidebar_field(&self) -> SidebarField {
        SIDEBAR_FIELDS[self.sidebar_index]
    }

    /// Drain orchestrator events; called once per frame
    pub fn poll_events(&mut self) {
        self.orchestrator.poll();
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::ToggleHelp => {
                self.show_help = !self.show_help;
            }
            AppAction::ToggleSidebar => {
                self.view.toggle_sidebar();
            }
            AppAction::ResetParams => {
                if self.mode == Mode::Normal {
                    self.params.reset();
                }
            }
            AppAction::OpenFile => {
                self.open_file_prompt();
            }
            AppAction::NextField => {
                self.cancel_key_edit();
                self.sidebar_index = (self.sidebar_index + 1) % SIDEBAR_FIELDS.len();
            }
            AppAction::PrevField => {
                self.cancel_key_edit();
                self.sidebar_index = if self.sidebar_index == 0 {
                    SIDEBAR_FIELDS.len() - 1
                } else {
                    self.sidebar_index - 1
                };
            }
            AppAction::Increase => self.adjust_field(1),
            AppAction::Decrease => self.adjust_field(-1),
            AppAction::ScrollUp => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                self.scroll_preview(1);
            }
            AppAction::ScrollPageUp => {
                self.preview_scroll = self.preview_scroll.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_preview(10);
            }
            AppAction::Escape => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.cancel_key_edit();
                    if self.mode == Mode::PickingFile {
                        self.mode = Mode::Normal;
                    }
                }
            }
            AppAction::Submit => self.submit().await,
            AppAction::Input(key) => self.handle_input(key),
            AppAction::Tick => {}
        }
    }

    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        match self.mode {
            Mode::EditingKey => {
                self.key_input.input(key);
            }
            Mode::PickingFile => {
                self.path_input.input(key);
            }
            Mode::Normal => match key.code {
                KeyCode::Char('1') => self.view.select(FunctionPanel::Home),
                KeyCode::Char('2') => self.view.select(FunctionPanel::Summarize),
                KeyCode::Char('3') => self.view.select(FunctionPanel::Analyze),
                KeyCode::Char('e') if self.sidebar_field() == SidebarField::ApiKey => {
                    self.begin_key_edit();
                }
                _ => {}
            },
        }
    }

    async fn submit(&mut self) {
        match self.mode {
            Mode::EditingKey => {
                let raw = self.key_input.lines().join("");
                self.params.set_api_key(raw);
                self.mode = Mode::Normal;
            }
            Mode::PickingFile => {
                self.confirm_file().await;
            }
            Mode::Normal => {
                if self.sidebar_field() == SidebarField::ApiKey {
                    self.begin_key_edit();
                }
            }
        }
    }

    fn begin_key_edit(&mut self) {
        self.key_input = masked_input("sk-...");
        self.mode = Mode::EditingKey;
    }

    fn cancel_key_edit(&mut self) {
        if self.mode == Mode::EditingKey {
            self.key_input = masked_input("sk-...");
            self.mode = Mode::Normal;
        }
    }

    /// Left/Right on the selected sidebar field
    fn adjust_field(&mut self, direction: i32) {
        if self.mode != Mode::Normal {
            return;
        }
        match self.sidebar_field() {
            SidebarField::ApiKey => {}
            SidebarField::Model => {
                let model = self.params.model();
                self.params.set_model(if direction > 0 {
                    model.next()
                } else {
                    model.prev()
                });
            }
            SidebarField::Temperature => {
                let stepped = params::step(self.params.temperature(), direction);
                self.params.set_temperature(stepped);
            }
            SidebarField::TopP => {
                let stepped = params::step(self.params.top_p(), direction);
                self.params.set_top_p(stepped);
            }
        }
    }

    fn scroll_preview(&mut self, lines: usize) {
        let max = self
            .orchestrator
            .state()
            .table()
            .map(|t| t.rows.len().saturating_sub(1))
            .unwrap_or(0);
        self.preview_scroll = (self.preview_scroll + lines).min(max);
    }

    /// The upload surface only exists on the Summarize/Analyze panels
    fn open_file_prompt(&mut self) {
        if self.mode != Mode::Normal {
            return;
        }
        if self.view.selected() == FunctionPanel::Home {
            self.status_note =
                Some("Select Summarize CSV [2] or Analyze CSV [3] first".to_string());
            return;
        }
        self.status_note = None;
        self.mode = Mode::PickingFile;
    }

    async fn confirm_file(&mut self) {
        let path = self.path_input.lines().join("").trim().to_string();
        if path.is_empty() {
            return;
        }
        self.mode = Mode::Normal;

        match Self::load_file(&path).await {
            Ok(file) => {
                self.preview_scroll = 0;
                self.status_note = None;
                self.orchestrator.start(file, self.params.snapshot());
            }
            Err(e) => {
                warn!(%path, error = %e, "file selection failed");
                self.status_note = Some(e.to_string());
            }
        }
    }

    async fn load_file(path: &str) -> AppResult<SourceFile> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AppError::FileRead {
                path: path.to_string(),
                source,
            })?;

        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Ok(SourceFile {
            name,
            bytes: Bytes::from(bytes),
        })
    }
}

fn masked_input(placeholder: &str) -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text(placeholder);
    input.set_mask_char('•');
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, SummarizeResponse, UploadResponse};
    use crate::params::ParamSnapshot;
    use async_trait::async_trait;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    impl PreferenceStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
        }
    }

    /// Backend that always fails; app-level tests never reach the network
    struct NullBackend;

    #[async_trait]
    impl BackendApi for NullBackend {
        async fn upload(
            &self,
            _file: &SourceFile,
            _params: &ParamSnapshot,
        ) -> Result<UploadResponse, BackendError> {
            Err(BackendError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }

        async fn summarize(
            &self,
            _file: &SourceFile,
            _params: &ParamSnapshot,
        ) -> Result<SummarizeResponse, BackendError> {
            Err(BackendError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    fn test_config() -> Config {
        Config {
            backend: crate::config::BackendConfig {
                base_url: "http://localhost:8000".to_string(),
            },
            log: crate::config::LogConfig {
                dir: "logs".to_string(),
                filter: "tablesum=debug".to_string(),
            },
        }
    }

    fn test_app() -> App {
        App::with_parts(
            test_config(),
            Arc::new(MemoryStore::default()),
            Arc::new(NullBackend),
        )
    }

    fn char_key(c: char) -> AppAction {
        AppAction::Input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn digit_keys_select_panels() {
        let mut app = test_app();
        app.handle_action(char_key('2')).await;
        assert_eq!(app.view.selected(), FunctionPanel::Summarize);
        app.handle_action(char_key('3')).await;
        assert_eq!(app.view.selected(), FunctionPanel::Analyze);
        app.handle_action(char_key('1')).await;
        assert_eq!(app.view.selected(), FunctionPanel::Home);
    }

    #[tokio::test]
    async fn key_edit_commits_on_submit_and_updates_validity() {
        let mut app = test_app();
        assert_eq!(app.sidebar_field(), SidebarField::ApiKey);

        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.mode, Mode::EditingKey);

        for c in "sk-0123456789012345678901".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.params.api_key(), "sk-0123456789012345678901");
        assert!(app.params.api_key_valid());
    }

    #[tokio::test]
    async fn escape_cancels_a_key_edit_without_committing() {
        let mut app = test_app();
        app.handle_action(AppAction::Submit).await;
        app.handle_action(char_key('x')).await;
        app.handle_action(AppAction::Escape).await;

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.params.api_key(), "");
    }

    #[tokio::test]
    async fn arrows_step_the_selected_slider() {
        let mut app = test_app();
        // Tab to Model, then Temperature
        app.handle_action(AppAction::NextField).await;
        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.sidebar_field(), SidebarField::Temperature);

        app.handle_action(AppAction::Decrease).await;
        assert_eq!(app.params.temperature(), 0.6);
        app.handle_action(AppAction::Increase).await;
        app.handle_action(AppAction::Increase).await;
        assert_eq!(app.params.temperature(), 0.8);
        // top_p untouched
        assert_eq!(app.params.top_p(), 0.7);
    }

    #[tokio::test]
    async fn model_field_cycles_identifiers() {
        let mut app = test_app();
        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.sidebar_field(), SidebarField::Model);

        app.handle_action(AppAction::Increase).await;
        assert_eq!(app.params.model().as_str(), "gpt-4");
        app.handle_action(AppAction::Decrease).await;
        assert_eq!(app.params.model().as_str(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn reset_action_restores_defaults() {
        let mut app = test_app();
        app.handle_action(AppAction::NextField).await;
        app.handle_action(AppAction::Increase).await; // model -> gpt-4
        app.handle_action(AppAction::NextField).await;
        app.handle_action(AppAction::Increase).await; // temperature -> 0.8

        app.handle_action(AppAction::ResetParams).await;
        assert_eq!(app.params.temperature(), 0.7);
        assert_eq!(app.params.top_p(), 0.7);
        assert_eq!(app.params.api_key(), "");
        // model untouched by reset
        assert_eq!(app.params.model().as_str(), "gpt-4");
    }

    #[tokio::test]
    async fn file_prompt_requires_a_function_panel() {
        let mut app = test_app();
        app.handle_action(AppAction::OpenFile).await;
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.status_note.is_some());

        app.handle_action(char_key('2')).await;
        app.handle_action(AppAction::OpenFile).await;
        assert_eq!(app.mode, Mode::PickingFile);
        assert_eq!(app.status_note, None);
    }

    #[tokio::test]
    async fn unreadable_file_surfaces_a_note_and_starts_nothing() {
        let mut app = test_app();
        app.handle_action(char_key('2')).await;
        app.handle_action(AppAction::OpenFile).await;
        for c in "/no/such/file.csv".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;

        assert_eq!(app.mode, Mode::Normal);
        assert!(app.status_note.as_deref().unwrap().contains("/no/such/file.csv"));
        assert!(matches!(
            app.orchestrator.state(),
            crate::session::SessionState::Idle
        ));
    }

    #[tokio::test]
    async fn selecting_a_readable_file_enters_uploading() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "name,age\nA,30\n").unwrap();

        let mut app = test_app();
        app.handle_action(char_key('2')).await;
        app.handle_action(AppAction::OpenFile).await;
        for c in path.to_string_lossy().chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;

        assert!(app.orchestrator.state().loading());
    }
}
