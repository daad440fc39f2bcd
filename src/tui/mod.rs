pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use app::{Field, InputMode, View};

const TICK_RATE_MS: u64 = 250;

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(TICK_RATE_MS);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Editing(_) => match key.code {
            KeyCode::Enter => app.confirm_edit(),
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => app.pop_edit_char(),
            KeyCode::Char(c) => app.push_edit_char(c),
            _ => {}
        },
        InputMode::SearchInput => match key.code {
            KeyCode::Enter | KeyCode::Esc => app.finish_search_input(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Down => app.next_row(),
            KeyCode::Up => app.previous_row(),
            KeyCode::Char(c) => app.push_search_char(c),
            _ => {}
        },
        InputMode::ImportPath => match key.code {
            KeyCode::Enter => app.confirm_import(),
            KeyCode::Esc => app.cancel_import_input(),
            KeyCode::Backspace => app.pop_edit_char(),
            KeyCode::Char(c) => app.push_path_char(c),
            _ => {}
        },
        InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    // Keys shared by every view
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.next_view();
            return;
        }
        KeyCode::BackTab => {
            app.previous_view();
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            let i = c as usize - '1' as usize;
            app.set_view(View::ALL[i]);
            return;
        }
        KeyCode::Char('?') => {
            app.show_help();
            return;
        }
        KeyCode::Char('E') => {
            app.export_backup();
            return;
        }
        KeyCode::Char('I') => {
            app.start_import_input();
            return;
        }
        KeyCode::Char('/') => {
            app.start_search_input();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.next_row();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.previous_row();
            return;
        }
        _ => {}
    }

    match app.view {
        View::Rate => match key.code {
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char(' ') => app.activate_field(),
            KeyCode::Char('x') => app.toggle(Field::Special),
            KeyCode::Char('f') => app.toggle(Field::Flou),
            KeyCode::Char('s') => {
                app.save_current();
            }
            KeyCode::Char('n') => app.save_and_next(),
            KeyCode::Char('N') => app.next_genre(),
            KeyCode::Char('o') => app.open_current_url(),
            _ => {}
        },
        View::Search => match key.code {
            KeyCode::Char('i') => app.start_search_input(),
            KeyCode::Enter => app.open_selected_search(),
            _ => {}
        },
        View::Rank => match key.code {
            KeyCode::Char('r') => app.toggle_rank_order(),
            KeyCode::Enter => app.open_selected_rank(),
            _ => {}
        },
        View::Stats => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::genres::{GenreList, DEFAULT_URL_TEMPLATE};
    use crate::session::Session;
    use crate::store::RatingStore;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "genre_rater_test_keys_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn app(path: &PathBuf) -> App {
        let genres = GenreList::from_text("ambient\ndrone\nnoise\n");
        let store = RatingStore::open(path).unwrap();
        let session = Session::open(genres, store, DEFAULT_URL_TEMPLATE);
        App::new(session, Config::default(), ThemeColors::dark())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_rate_with_keys() {
        let path = temp_path("rate");
        let mut app = app(&path);

        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "8");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "4");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('n'));

        let saved = app.session.store().get_rating(0).unwrap();
        assert_eq!(saved.skip, Some(8));
        assert_eq!(saved.kiff, Some(4));
        assert!(saved.flou);
        assert_eq!(app.session.position(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_typing_q_while_editing_does_not_quit() {
        let path = temp_path("edit_q");
        let mut app = app(&path);
        app.selected_field = Field::Comment;
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "quiet");
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.draft.comment, "quiet");
    }

    #[test]
    fn test_number_keys_switch_view() {
        let path = temp_path("views");
        let mut app = app(&path);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::Rank);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.view, View::Stats);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, View::Rate);
    }

    #[test]
    fn test_search_with_keys() {
        let path = temp_path("search");
        let mut app = app(&path);
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "dro");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view, View::Rate);
        assert_eq!(app.session.current_name(), Some("drone"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_import_prompt_keys() {
        let path = temp_path("import");
        let mut app = app(&path);
        press(&mut app, KeyCode::Char('I'));
        assert_eq!(app.input_mode, InputMode::ImportPath);
        type_str(&mut app, "q");
        assert!(!app.should_quit);
        assert!(app.edit_buffer.ends_with('q'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.edit_buffer.is_empty());
    }

    #[test]
    fn test_help_and_quit() {
        let path = temp_path("help");
        let mut app = app(&path);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, InputMode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);

        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
