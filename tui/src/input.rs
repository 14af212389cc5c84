//! Input handling for the promptdeck TUI.
//!
//! Synchronous crossterm polling with per-mode key dispatch. Modifier keys
//! are checked before plain characters so Ctrl-C always quits.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use promptdeck_engine::{App, InputMode};

/// Poll for one input event and apply it to the app. Returns once `timeout`
/// elapses with no input.
pub fn handle_events(app: &mut App, timeout: Duration) -> Result<()> {
    if !event::poll(timeout)? {
        return Ok(());
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => handle_paste(app, &text),
        _ => {}
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return;
    }

    match app.input_mode() {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Insert => handle_insert_key(app, key),
        InputMode::Command => handle_command_key(app, key),
        InputMode::SaveTemplate => handle_save_key(app, key),
        InputMode::Templates => handle_templates_key(app, key),
    }
}

fn handle_paste(app: &mut App, text: &str) {
    match app.input_mode() {
        InputMode::Insert => {
            // Custom text is a single line.
            let flattened = text.replace(['\r', '\n'], " ");
            app.insert_text(&flattened);
        }
        InputMode::Command => {
            for ch in text.chars().filter(|ch| !ch.is_control()) {
                app.command_char(ch);
            }
        }
        InputMode::SaveTemplate => {
            for ch in text.chars().filter(|ch| !ch.is_control()) {
                app.save_char(ch);
            }
        }
        InputMode::Normal | InputMode::Templates => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_category(),
        KeyCode::Right | KeyCode::Char('l') => app.next_category(),
        KeyCode::Char(digit @ '1'..='6') => {
            let index = digit as usize - '1' as usize;
            app.select_category(index);
        }
        KeyCode::Tab => app.next_section(),
        KeyCode::BackTab => app.prev_section(),
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_current(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.weight_up(),
        KeyCode::Char('-') => app.weight_down(),
        KeyCode::Char('i') => app.begin_insert(),
        KeyCode::Char(':') => app.begin_command(),
        KeyCode::Char('m') => app.toggle_mode(),
        KeyCode::Char('c') => app.copy_prompt(),
        KeyCode::Char('x') => app.clear_all(),
        KeyCode::Char('s') => app.begin_save_template(),
        KeyCode::Char('t') => app.open_templates(),
        KeyCode::Char('?') => app.run_command("help"),
        _ => {}
    }
}

fn handle_insert_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('w') {
        app.insert_delete_word();
        return;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.leave_insert(),
        KeyCode::Backspace => app.insert_backspace(),
        KeyCode::Delete => app.insert_delete_forward(),
        KeyCode::Left => app.insert_cursor_left(),
        KeyCode::Right => app.insert_cursor_right(),
        KeyCode::Char(ch) => app.insert_char(ch),
        _ => {}
    }
}

fn handle_command_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_command(),
        KeyCode::Enter => app.submit_command(),
        KeyCode::Backspace => app.command_backspace(),
        KeyCode::Char(ch) => app.command_char(ch),
        _ => {}
    }
}

fn handle_save_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_save(),
        KeyCode::Enter => app.confirm_save(),
        KeyCode::Backspace => app.save_backspace(),
        KeyCode::Char(ch) => app.save_char(ch),
        _ => {}
    }
}

fn handle_templates_key(app: &mut App, key: KeyEvent) {
    if app.browser().filter_active {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.browser_mut().filter_active = false,
            KeyCode::Backspace => {
                let browser = app.browser_mut();
                browser.filter.delete_char();
                browser.clamp_cursor();
            }
            KeyCode::Char(ch) => {
                let browser = app.browser_mut();
                browser.filter.enter_char(ch);
                browser.clamp_cursor();
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_templates(),
        KeyCode::Up | KeyCode::Char('k') => app.browser_mut().move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.browser_mut().move_down(),
        KeyCode::Enter => app.load_selected_template(),
        KeyCode::Char('d') => app.delete_selected_template(),
        KeyCode::Char('/') => app.browser_mut().filter_active = true,
        _ => {}
    }
}
