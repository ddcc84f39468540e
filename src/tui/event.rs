//! Event Handling
//!
//! Maps keyboard and timer events to application actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Force quit without confirmation
    ForceQuit,
    /// Confirm current input (Enter key)
    Submit,
    /// Escape - close overlays, cancel edits
    Escape,
    /// Collapse or expand the sidebar
    ToggleSidebar,
    /// Toggle help overlay
    ToggleHelp,
    /// Open the file prompt
    OpenFile,
    /// Restore default parameters
    ResetParams,
    /// Move to next sidebar field (Tab)
    NextField,
    /// Move to previous sidebar field (Shift+Tab)
    PrevField,
    /// Increase the selected sidebar value (Right)
    Increase,
    /// Decrease the selected sidebar value (Left)
    Decrease,
    /// Scroll preview up one row
    ScrollUp,
    /// Scroll preview down one row
    ScrollDown,
    /// Scroll preview up one page
    ScrollPageUp,
    /// Scroll preview down one page
    ScrollPageDown,
    /// Regular input character
    Input(KeyEvent),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Try to get the next action without blocking
    pub async fn try_next(&mut self) -> Option<AppAction> {
        self.rx.try_recv().ok()
    }

    fn map_event(event: Event) -> Option<AppAction> {
        match event {
            Event::Key(key) => Some(Self::map_key_event(key)),
            _ => None,
        }
    }

    /// Map a key event to an app action
    fn map_key_event(key: KeyEvent) -> AppAction {
        match (key.modifiers, key.code) {
            // Quit shortcuts
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => AppAction::ForceQuit,
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => AppAction::Quit,

            // Workspace shortcuts
            (KeyModifiers::CONTROL, KeyCode::Char('b')) => AppAction::ToggleSidebar,
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => AppAction::OpenFile,
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => AppAction::ResetParams,

            (KeyModifiers::SHIFT, KeyCode::BackTab) => AppAction::PrevField,

            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => AppAction::Escape,
                KeyCode::Enter => AppAction::Submit,
                KeyCode::F(1) => AppAction::ToggleHelp,

                KeyCode::Tab => AppAction::NextField,
                KeyCode::BackTab => AppAction::PrevField,

                KeyCode::Left => AppAction::Decrease,
                KeyCode::Right => AppAction::Increase,

                KeyCode::Up => AppAction::ScrollUp,
                KeyCode::Down => AppAction::ScrollDown,
                KeyCode::PageUp => AppAction::ScrollPageUp,
                KeyCode::PageDown => AppAction::ScrollPageDown,

                _ => AppAction::Input(key),
            },

            // Pass through other key combinations as input
            _ => AppAction::Input(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords_map_to_workspace_actions() {
        assert!(matches!(
            EventHandler::map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('o'))),
            AppAction::OpenFile
        ));
        assert!(matches!(
            EventHandler::map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('b'))),
            AppAction::ToggleSidebar
        ));
        assert!(matches!(
            EventHandler::map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('r'))),
            AppAction::ResetParams
        ));
    }

    #[test]
    fn plain_characters_pass_through_as_input() {
        let action = EventHandler::map_key_event(key(KeyModifiers::NONE, KeyCode::Char('2')));
        assert!(matches!(action, AppAction::Input(k) if k.code == KeyCode::Char('2')));
    }

    #[test]
    fn arrows_adjust_and_scroll() {
        assert!(matches!(
            EventHandler::map_key_event(key(KeyModifiers::NONE, KeyCode::Right)),
            AppAction::Increase
        ));
        assert!(matches!(
            EventHandler::map_key_event(key(KeyModifiers::NONE, KeyCode::Down)),
            AppAction::ScrollDown
        ));
    }
}
