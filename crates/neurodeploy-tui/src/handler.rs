use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every pane
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Config => FocusPane::Preview,
                FocusPane::Preview if app.assistant.open => FocusPane::Assistant,
                FocusPane::Preview | FocusPane::Assistant => FocusPane::Config,
            };
            return;
        }
        KeyCode::Char('a') => {
            app.open_assistant();
            return;
        }
        KeyCode::Char(c @ '1'..='8') => {
            app.select_tab(c as usize - '1' as usize);
            return;
        }
        KeyCode::Char(']') => {
            app.next_tab();
            return;
        }
        KeyCode::Char('[') => {
            app.prev_tab();
            return;
        }
        KeyCode::Char('c') => {
            app.copy_active();
            return;
        }
        KeyCode::Char('d') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.download_active();
            return;
        }
        KeyCode::Char('D') => {
            app.download_all();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Config => handle_config_normal(app, key),
        FocusPane::Preview => handle_preview_normal(app, key),
        FocusPane::Assistant => handle_assistant_normal(app, key),
    }
}

fn handle_config_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.config_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.config_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
            app.activate_row(true);
        }
        KeyCode::Char('h') | KeyCode::Left => app.activate_row(false),
        _ => {}
    }
}

fn handle_preview_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.next_tab(),
        KeyCode::Char('h') | KeyCode::Left => app.prev_tab(),
        KeyCode::Char('j') | KeyCode::Down => app.preview.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.preview.scroll_up(1),
        KeyCode::Char('g') => app.preview.scroll = 0,
        KeyCode::Char('G') => app.preview.scroll = u16::MAX,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_preview_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_preview_half_page_up();
        }
        KeyCode::Esc => app.focus = FocusPane::Config,
        _ => {}
    }
}

fn handle_assistant_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.assistant.cursor_end();
        }
        KeyCode::Esc => app.close_assistant(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.send_question(),
        KeyCode::Backspace => app.assistant.backspace(),
        KeyCode::Delete => app.assistant.delete(),
        KeyCode::Left => app.assistant.cursor_left(),
        KeyCode::Right => app.assistant.cursor_right(),
        KeyCode::Home => app.assistant.cursor_home(),
        KeyCode::End => app.assistant.cursor_end(),
        KeyCode::Char(c) => app.assistant.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_config = app.config_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_preview = app.preview_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_preview {
                app.preview.scroll_down(3);
            } else if in_chat {
                app.chat_scroll = app.chat_scroll.saturating_add(3);
            } else if in_config {
                app.config_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_preview {
                app.preview.scroll_up(3);
            } else if in_chat {
                app.chat_scroll = app.chat_scroll.saturating_sub(3);
            } else if in_config {
                app.config_nav_up();
            }
        }
        _ => {}
    }
}
