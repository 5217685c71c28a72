//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in the status bar (`ui::draw_status_bar`).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char(' ') | KeyCode::Char('t') => app.toggle_page(),
        KeyCode::Char('s') => app.set_page_open(true),
        KeyCode::Char('h') => app.set_page_open(false),
        KeyCode::Char('a') => app.toggle_faq(),
        KeyCode::Char('u') => app.next_user(),
        KeyCode::Char('r') => app.reload_focused(),
        KeyCode::Tab | KeyCode::BackTab => app.switch_focus(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Down | KeyCode::Char('j') => app.focused_mut().select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.focused_mut().select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.focused_mut().select_first(),
        KeyCode::End | KeyCode::Char('G') => app.focused_mut().select_last(),
        _ => {}
    }
}
