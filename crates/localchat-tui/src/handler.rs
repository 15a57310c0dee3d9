use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, MenuAction, Popup};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C goes through the save prompt once; a second press leaves immediately.
    if ctrl && key.code == KeyCode::Char('c') {
        if app.popup == Popup::None {
            app.request_quit();
        } else {
            app.should_quit = true;
        }
        return;
    }

    match app.popup {
        Popup::None => handle_chat_key(app, key),
        Popup::Menu => handle_menu_key(app, key),
        Popup::ConfirmSave { .. } => handle_confirm_key(app, key),
        Popup::TitlePrompt { .. } => handle_title_key(app, key),
        Popup::Browser { .. } => handle_browser_key(app, key),
        Popup::Notice { .. } => app.close_popup(),
    }
}

fn shortcut(key: &KeyEvent) -> Option<MenuAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(1) => Some(MenuAction::AboutOllama),
        KeyCode::Char('n') if ctrl => Some(MenuAction::NewConversation),
        KeyCode::Char('s') if ctrl => Some(MenuAction::SaveConversation),
        KeyCode::Char('o') if ctrl => Some(MenuAction::LoadConversation),
        KeyCode::Char('t') if ctrl => Some(MenuAction::ToggleTheme),
        KeyCode::Char('q') if ctrl => Some(MenuAction::Quit),
        _ => None,
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    if let Some(action) = shortcut(&key) {
        app.perform(action);
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(10) | KeyCode::Esc => app.open_menu(),

        // Transcript scrolling
        KeyCode::PageUp => app.scroll_up(app.page_rows()),
        KeyCode::PageDown => app.scroll_down(app.page_rows()),
        KeyCode::Up if ctrl => app.scroll_up(1),
        KeyCode::Down if ctrl => app.scroll_down(1),

        // The input line is disabled while a reply is pending
        _ if app.session.is_waiting() => {}

        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) if !ctrl => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.menu_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.menu_nav_up(),
        KeyCode::Enter => app.activate_selected_menu(),
        KeyCode::Esc | KeyCode::F(10) | KeyCode::Char('q') => app.close_popup(),
        _ => {
            if let Some(action) = shortcut(&key) {
                app.close_popup();
                app.perform(action);
            }
        }
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_save_prompt(true),
        KeyCode::Char('n') | KeyCode::Char('N') => app.answer_save_prompt(false),
        KeyCode::Esc => app.close_popup(),
        _ => {}
    }
}

fn handle_title_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_title(),
        KeyCode::Esc => app.cancel_title(),
        KeyCode::Backspace => {
            app.title_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.title_input.push(c);
        }
        _ => {}
    }
}

fn handle_browser_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.browser_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.browser_nav_up(),
        KeyCode::Enter => app.load_selected(),
        KeyCode::Esc | KeyCode::Char('q') => app.close_popup(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.popup != Popup::None {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}
