use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus};
use crate::tui::ChatEvent;

pub fn handle_event(app: &mut App, event: ChatEvent) {
    match event {
        ChatEvent::Key(key) => handle_key(app, key),
        ChatEvent::Paste(text) => {
            if app.input_enabled() && app.focus == Focus::Input {
                app.insert_str(&text);
            }
        }
        ChatEvent::ScrollUp => app.scroll_up(3),
        ChatEvent::ScrollDown => app.scroll_down(3),
        ChatEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work even while a reply is pending
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('t') if ctrl => {
            app.toggle_theme();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_up(app.chat_height.max(2) / 2);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_down(app.chat_height.max(2) / 2);
            return;
        }
        _ => {}
    }

    if !app.input_enabled() {
        return;
    }

    match app.focus {
        Focus::Input => handle_input_key(app, key),
        Focus::Suggestions => handle_suggestion_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Alt/Shift+Enter for a new line, Enter to send
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            app.insert_char('\n');
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Tab if app.show_welcome => app.focus = Focus::Suggestions,
        KeyCode::Up => app.recall_older(),
        KeyCode::Down => app.recall_newer(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
        _ => app.history.reset(),
    }
}

fn handle_suggestion_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.suggestion_next(),
        KeyCode::Char('k') | KeyCode::Up => app.suggestion_prev(),
        KeyCode::Enter => app.submit_selected_suggestion(),
        KeyCode::Tab | KeyCode::Esc => app.focus = Focus::Input,
        _ => {}
    }
}
