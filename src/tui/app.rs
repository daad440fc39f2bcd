use chrono::Local;
use ratatui::widgets::TableState;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::output::format_import_report;
use crate::score::{parse_score_input, RankOrder, RankedGenre, Stats};
use crate::session::{Draft, Session};
use crate::store::backup_file_name;

use super::theme::ThemeColors;

/// How many search matches are listed at once
pub const SEARCH_DISPLAY_LIMIT: usize = 50;

const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Rate,
    Search,
    Rank,
    Stats,
}

impl View {
    pub const ALL: [View; 4] = [View::Rate, View::Search, View::Rank, View::Stats];

    pub fn title(self) -> &'static str {
        match self {
            View::Rate => "Rate",
            View::Search => "Search",
            View::Rank => "Rank",
            View::Stats => "Stats",
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

/// Rows of the rating form, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Skip,
    Kiff,
    Special,
    Flou,
    Comment,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Skip,
        Field::Kiff,
        Field::Special,
        Field::Flou,
        Field::Comment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Skip => "Skip (0-10)",
            Field::Kiff => "Kiff (0-10)",
            Field::Special => "Special",
            Field::Flou => "Flou",
            Field::Comment => "Comment",
        }
    }

    fn is_toggle(self) -> bool {
        matches!(self, Field::Special | Field::Flou)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(Field),
    SearchInput,
    ImportPath,
    Help,
}

pub struct App {
    pub session: Session,
    pub config: Config,
    pub theme: ThemeColors,
    pub view: View,
    pub input_mode: InputMode,
    pub draft: Draft,
    pub dirty: bool,
    pub selected_field: Field,
    pub edit_buffer: String,
    pub search_query: String,
    pub search_state: TableState,
    pub rank_order: RankOrder,
    pub rank_state: TableState,
    pub ranking: Vec<RankedGenre>,
    pub stats: Stats,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub backup_dir: PathBuf,
}

impl App {
    pub fn new(session: Session, config: Config, theme: ThemeColors) -> Self {
        let backup_dir = session
            .store()
            .path()
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        let draft = session.draft();

        let mut app = Self {
            session,
            config,
            theme,
            view: View::Rate,
            input_mode: InputMode::Normal,
            draft,
            dirty: false,
            selected_field: Field::Skip,
            edit_buffer: String::new(),
            search_query: String::new(),
            search_state: TableState::default(),
            rank_order: RankOrder::default(),
            rank_state: TableState::default(),
            ranking: Vec::new(),
            stats: Stats::default(),
            flash_message: None,
            should_quit: false,
            backup_dir,
        };
        app.refresh_aggregates();
        app
    }

    /// Re-derive ranking and stats from the stored ratings
    pub fn refresh_aggregates(&mut self) {
        self.ranking = self.session.ranking(self.rank_order);
        self.stats = self.session.stats();
        clamp_selection(&mut self.rank_state, self.ranking.len());
    }

    // Views

    pub fn next_view(&mut self) {
        let i = (self.view.index() + 1) % View::ALL.len();
        self.view = View::ALL[i];
    }

    pub fn previous_view(&mut self) {
        let len = View::ALL.len();
        let i = (self.view.index() + len - 1) % len;
        self.view = View::ALL[i];
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    // Rating form

    pub fn next_field(&mut self) {
        let i = field_index(self.selected_field);
        self.selected_field = Field::ALL[(i + 1) % Field::ALL.len()];
    }

    pub fn previous_field(&mut self) {
        let len = Field::ALL.len();
        let i = field_index(self.selected_field);
        self.selected_field = Field::ALL[(i + len - 1) % len];
    }

    /// Enter edit mode on the selected field, or flip it if it is a flag
    pub fn activate_field(&mut self) {
        let field = self.selected_field;
        if field.is_toggle() {
            self.toggle(field);
            return;
        }
        self.edit_buffer = match field {
            Field::Skip => self.draft.skip.map(|v| v.to_string()).unwrap_or_default(),
            Field::Kiff => self.draft.kiff.map(|v| v.to_string()).unwrap_or_default(),
            _ => self.draft.comment.clone(),
        };
        self.input_mode = InputMode::Editing(field);
    }

    pub fn toggle(&mut self, field: Field) {
        match field {
            Field::Special => self.draft.special = !self.draft.special,
            Field::Flou => self.draft.flou = !self.draft.flou,
            _ => return,
        }
        self.dirty = true;
    }

    /// Accept a typed character for the field being edited
    pub fn push_edit_char(&mut self, c: char) {
        let InputMode::Editing(field) = self.input_mode else {
            return;
        };
        let accepted = match field {
            Field::Skip | Field::Kiff => c.is_ascii_digit() || c == '.' || c == '-',
            _ => !c.is_control(),
        };
        if accepted {
            self.edit_buffer.push(c);
        }
    }

    pub fn pop_edit_char(&mut self) {
        self.edit_buffer.pop();
    }

    pub fn confirm_edit(&mut self) {
        let InputMode::Editing(field) = self.input_mode else {
            return;
        };
        match field {
            Field::Skip => self.draft.skip = parse_score_input(&self.edit_buffer),
            Field::Kiff => self.draft.kiff = parse_score_input(&self.edit_buffer),
            Field::Comment => self.draft.comment = self.edit_buffer.clone(),
            Field::Special | Field::Flou => {}
        }
        self.dirty = true;
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();
    }

    /// Live score of the draft, with an in-progress edit applied
    pub fn draft_score(&self) -> Option<f64> {
        let mut draft = self.draft.clone();
        match self.input_mode {
            InputMode::Editing(Field::Skip) => draft.skip = parse_score_input(&self.edit_buffer),
            InputMode::Editing(Field::Kiff) => draft.kiff = parse_score_input(&self.edit_buffer),
            _ => {}
        }
        draft.score()
    }

    /// Save the draft for the current genre
    pub fn save_current(&mut self) -> bool {
        match self.session.save(&self.draft) {
            Ok(Some(rating)) => {
                self.dirty = false;
                self.refresh_aggregates();
                self.show_flash(format!("Saved: {}", rating.name));
                true
            }
            Ok(None) => {
                self.show_flash("Error: no genres loaded".to_string());
                false
            }
            Err(e) => {
                self.show_flash(format!("Failed to save: {:#}", e));
                false
            }
        }
    }

    pub fn save_and_next(&mut self) {
        if self.save_current() {
            self.next_genre();
        }
    }

    /// Move to the next genre, dropping unsaved edits
    pub fn next_genre(&mut self) {
        let discarded = self.dirty;
        match self.session.advance() {
            Ok(_) => {
                self.load_draft();
                if discarded {
                    self.show_flash("Unsaved changes discarded".to_string());
                }
            }
            Err(e) => self.show_flash(format!("Failed to move: {:#}", e)),
        }
    }

    /// Jump to a genre and show it in the Rate view
    pub fn open_genre(&mut self, genre_id: usize) {
        let discarded = self.dirty;
        match self.session.jump_to(genre_id) {
            Ok(_) => {
                self.load_draft();
                self.view = View::Rate;
                if discarded {
                    self.show_flash("Unsaved changes discarded".to_string());
                }
            }
            Err(e) => self.show_flash(format!("Failed to move: {:#}", e)),
        }
    }

    fn load_draft(&mut self) {
        self.draft = self.session.draft();
        self.dirty = false;
        self.selected_field = Field::Skip;
    }

    pub fn open_current_url(&mut self) {
        let Some(url) = self.session.current_url() else {
            return;
        };
        match crate::browser::open_url(&url) {
            Ok(()) => self.show_flash(format!("Opened: {}", url)),
            Err(e) => self.show_flash(format!("Failed to open browser: {}", e)),
        }
    }

    // Search

    pub fn start_search_input(&mut self) {
        self.view = View::Search;
        self.input_mode = InputMode::SearchInput;
    }

    pub fn push_search_char(&mut self, c: char) {
        if !c.is_control() {
            self.search_query.push(c);
            self.reset_search_selection();
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.reset_search_selection();
    }

    pub fn finish_search_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.reset_search_selection();
    }

    fn reset_search_selection(&mut self) {
        let selection = if self.visible_search_results().is_empty() {
            None
        } else {
            Some(0)
        };
        self.search_state.select(selection);
    }

    /// All matches for the current query, up to the configured limit
    pub fn search_results(&self) -> Vec<(usize, String)> {
        self.session
            .genres()
            .search(&self.search_query, self.config.search_limit)
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect()
    }

    /// The slice of matches listed on screen
    pub fn visible_search_results(&self) -> Vec<(usize, String)> {
        let mut results = self.search_results();
        results.truncate(SEARCH_DISPLAY_LIMIT);
        results
    }

    pub fn open_selected_search(&mut self) {
        let results = self.visible_search_results();
        if let Some((id, _)) = self.search_state.selected().and_then(|i| results.get(i)) {
            self.open_genre(*id);
        }
    }

    // Rank

    pub fn toggle_rank_order(&mut self) {
        self.rank_order = self.rank_order.toggled();
        self.refresh_aggregates();
        self.rank_state.select(if self.ranking.is_empty() { None } else { Some(0) });
    }

    /// Ranked genres listed on screen
    pub fn visible_ranking(&self) -> &[RankedGenre] {
        let shown = self.ranking.len().min(self.config.rank_limit);
        &self.ranking[..shown]
    }

    pub fn open_selected_rank(&mut self) {
        let selected = self
            .rank_state
            .selected()
            .and_then(|i| self.visible_ranking().get(i))
            .map(|item| item.genre_id);
        if let Some(id) = selected {
            self.open_genre(id);
        }
    }

    // Row navigation for list views

    pub fn next_row(&mut self) {
        match self.view {
            View::Rate => self.next_field(),
            View::Search => {
                let len = self.visible_search_results().len();
                step_selection(&mut self.search_state, len, true);
            }
            View::Rank => {
                let len = self.visible_ranking().len();
                step_selection(&mut self.rank_state, len, true);
            }
            View::Stats => {}
        }
    }

    pub fn previous_row(&mut self) {
        match self.view {
            View::Rate => self.previous_field(),
            View::Search => {
                let len = self.visible_search_results().len();
                step_selection(&mut self.search_state, len, false);
            }
            View::Rank => {
                let len = self.visible_ranking().len();
                step_selection(&mut self.rank_state, len, false);
            }
            View::Stats => {}
        }
    }

    // Backup

    /// Write a dated backup next to the ratings file
    pub fn export_backup(&mut self) {
        let path = self.backup_dir.join(backup_file_name(Local::now().date_naive()));
        match self.session.store().export_to_path(&path) {
            Ok(snapshot) => self.show_flash(format!(
                "Exported {} ratings to {}",
                snapshot.ratings.len(),
                path.display()
            )),
            Err(e) => self.show_flash(format!("Failed to export: {}", e)),
        }
    }

    /// Ask for a backup file to import, pre-filled with today's backup
    pub fn start_import_input(&mut self) {
        let default = self.backup_dir.join(backup_file_name(Local::now().date_naive()));
        self.edit_buffer = default.display().to_string();
        self.input_mode = InputMode::ImportPath;
    }

    pub fn push_path_char(&mut self, c: char) {
        if !c.is_control() {
            self.edit_buffer.push(c);
        }
    }

    pub fn cancel_import_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();
    }

    /// Replace all ratings from the typed backup path
    pub fn confirm_import(&mut self) {
        let path = PathBuf::from(self.edit_buffer.trim());
        self.cancel_import_input();

        match self.session.import_from_path(&path) {
            Ok(report) => {
                self.refresh_aggregates();
                self.load_draft();
                self.show_flash(format_import_report(&report));
            }
            Err(e) => self.show_flash(format!("Failed to import: {}", e)),
        }
    }

    // Overlays and flash messages

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }
}

fn field_index(field: Field) -> usize {
    Field::ALL.iter().position(|f| *f == field).unwrap_or(0)
}

/// Move a table selection one row, wrapping at both ends
fn step_selection(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

/// Keep a selection valid after the list changed length
fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if let Some(selected) = state.selected() {
        if selected >= len {
            state.select(Some(len - 1));
        }
    } else {
        state.select(Some(0));
    }
}
