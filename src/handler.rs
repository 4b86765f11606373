use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode, LineInput, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // An alert blocks everything until acknowledged
    if app.alert.is_some() {
        app.alert = None;
        return;
    }

    if app.show_image_prompt {
        handle_image_prompt(app, key);
        return;
    }

    if app.show_language_picker {
        handle_language_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_image_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_image_prompt = false;
            app.image_input.take();
        }
        KeyCode::Enter => app.attach_image(),
        _ => edit_line(&mut app.image_input, key),
    }
}

fn handle_language_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_language_picker = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.language_picker_nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.language_picker_nav_up();
        }
        KeyCode::Enter => app.select_language(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every screen
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.next_screen();
            return;
        }
        KeyCode::Char('l') => {
            app.open_language_picker();
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Letters => handle_letters_normal(app, key),
        Screen::Exercises => handle_exercises_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Start typing
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Microphone
        KeyCode::Char('r') => app.toggle_recording(),

        // Image
        KeyCode::Char('o') => app.open_image_prompt(),

        // Scroll
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('g') => app.scroll_chat_to_top(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_letters_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_letters_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_letters_up(1),
        KeyCode::Char('g') => app.letters_scroll = 0,
        _ => {}
    }
}

fn handle_exercises_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.exercise_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.exercise_nav_up(),
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.reveal_answers = !app.reveal_answers;
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send_input();
        }
        _ => edit_line(&mut app.input, key),
    }
}

/// Cursor movement and character editing shared by every text field
fn edit_line(input: &mut LineInput, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => match app.screen {
            Screen::Chat if in_chat => {
                for _ in 0..3 {
                    app.scroll_chat_down();
                }
            }
            Screen::Letters => app.scroll_letters_down(3),
            Screen::Exercises => app.exercise_nav_down(),
            _ => {}
        },
        MouseEventKind::ScrollUp => match app.screen {
            Screen::Chat if in_chat => {
                for _ in 0..3 {
                    app.scroll_chat_up();
                }
            }
            Screen::Letters => app.scroll_letters_up(3),
            Screen::Exercises => app.exercise_nav_up(),
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akshara_core::{Config, FsImagePicker, HttpBackend};
    use crossterm::event::KeyEventState;
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn test_app(dir: &tempfile::TempDir) -> App {
        // Never contacted: these tests stop short of sending
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        App::with_parts(
            Config::new(),
            Arc::new(backend),
            Box::new(FsImagePicker::new(dir.path())),
        )
    }

    #[tokio::test]
    async fn test_typing_edits_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "ನಮಸ್ತೆ".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Delete));
        handle_event(&mut app, key(KeyCode::End));
        handle_event(&mut app, key(KeyCode::Backspace));

        assert_eq!(app.input.text, "ಮಸ್ತ");

        // 'q' is text while editing
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.alert = Some("hello".to_string());

        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_language_picker_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Char('l')));
        assert!(app.show_language_picker);
        assert_eq!(app.language_picker_state.selected(), Some(0));

        handle_event(&mut app, key(KeyCode::Char('j')));
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_language_picker);
        assert_eq!(app.language(), akshara_core::Language::Kannada);
    }

    #[tokio::test]
    async fn test_image_prompt_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Char('o')));
        assert!(app.show_image_prompt);
        handle_event(&mut app, key(KeyCode::Char('a')));
        handle_event(&mut app, key(KeyCode::Esc));

        assert!(!app.show_image_prompt);
        assert!(app.image_input.text.is_empty());
        assert!(app.session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_tab_cycles_screens() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Letters);
        app.letters_height = 2;
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.letters_scroll, 1);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Exercises);
        handle_event(&mut app, key(KeyCode::Char(' ')));
        assert!(app.reveal_answers);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Chat);
    }

    #[tokio::test]
    async fn test_letters_scroll_stops_at_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        handle_event(&mut app, key(KeyCode::Tab));
        app.letters_height = 3;
        app.letters_width = 40;

        for _ in 0..500 {
            handle_event(&mut app, key(KeyCode::Char('j')));
        }
        let bottom = app.letters_scroll;
        assert!(bottom > 0 && bottom < 100, "scrolled to {}", bottom);

        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.letters_scroll, bottom);

        // Everything fits: no scrolling at all
        app.letters_scroll = 0;
        app.letters_height = 200;
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.letters_scroll, 0);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
