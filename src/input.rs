use anyhow::Result;
use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::app::App;
use crate::config::{disable_api_key_prompt, save_api_key};
use crate::models::FocusArea;

/// Handles one key press. Returns `false` when the app should quit.
pub fn handle_key(key: KeyEvent, app: &mut App) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(false);
    }
    if app.key_prompt.visible {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('d') {
            app.status = Some(match disable_api_key_prompt() {
                Ok(()) => "API key prompt disabled".to_string(),
                Err(e) => {
                    warn!(error = %e, "could not update user config");
                    format!("Could not update config: {e}")
                }
            });
            app.key_prompt.visible = false;
            app.key_prompt.buffer.clear();
            return Ok(true);
        }
        handle_key_prompt(key.code, app);
        return Ok(true);
    }
    app.status = None;

    match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.focus = app.focus.prev(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose(),
        KeyCode::Char('g') => {
            if !app.trigger_fetch() {
                let state = app.store.lock();
                app.status = Some(if state.loading {
                    "A request is already running".to_string()
                } else {
                    "Choose a genre, mood and level first".to_string()
                });
            }
        }
        KeyCode::PageDown => {
            if app.results.expanded.is_some() {
                app.results.scroll_down();
            }
        }
        KeyCode::PageUp => app.results.scroll = app.results.scroll.saturating_sub(1),
        KeyCode::Char('R') => app.reset(),
        KeyCode::Char('K') => {
            app.key_prompt.visible = true;
            app.key_prompt.buffer.clear();
        }
        KeyCode::Char('c') => {
            if let Some(text) = app.expanded_text() {
                app.status = Some(match Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
                    Ok(()) => "Copied to clipboard".to_string(),
                    Err(e) => {
                        warn!(error = %e, "clipboard unavailable");
                        format!("Clipboard error: {e}")
                    }
                });
            }
        }
        KeyCode::Esc => {
            if app.focus == FocusArea::Results {
                app.results.expanded = None;
                app.results.scroll = 0;
            }
        }
        _ => {}
    }
    Ok(true)
}

fn handle_key_prompt(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Char(c) => app.key_prompt.buffer.push(c),
        KeyCode::Backspace => {
            app.key_prompt.buffer.pop();
        }
        KeyCode::Tab => app.key_prompt.save = !app.key_prompt.save,
        KeyCode::Enter => {
            let key = app.key_prompt.buffer.trim().to_string();
            if key.is_empty() {
                return;
            }
            if app.key_prompt.save {
                app.status = Some(match save_api_key(&key) {
                    Ok(()) => "API key saved to user config".to_string(),
                    Err(e) => {
                        warn!(error = %e, "could not save API key");
                        format!("Could not save API key: {e}")
                    }
                });
            }
            app.set_api_key(key);
            app.key_prompt.visible = false;
            app.key_prompt.buffer.clear();
        }
        KeyCode::Esc => {
            app.key_prompt.visible = false;
            app.key_prompt.buffer.clear();
        }
        _ => {}
    }
}
