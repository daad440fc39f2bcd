use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;

use crate::genres::{reference_url, GenreList};
use crate::score::{compute_score, rank, stats, RankOrder, RankedGenre, Stats};
use crate::store::{ImportReport, Rating, RatingStore, StoreError};

/// The editable fields of a rating, as the user is filling them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub skip: Option<u8>,
    pub kiff: Option<u8>,
    pub special: bool,
    pub flou: bool,
    pub comment: String,
}

impl Draft {
    pub fn from_rating(rating: &Rating) -> Self {
        Self {
            skip: rating.skip,
            kiff: rating.kiff,
            special: rating.special,
            flou: rating.flou,
            comment: rating.comment.clone().unwrap_or_default(),
        }
    }

    /// Live score, identical to what ranking and stats compute once saved
    pub fn score(&self) -> Option<f64> {
        compute_score(self.skip, self.kiff, self.special, self.flou)
    }
}

/// Browsing and rating workflow over the genre list and the store.
///
/// Keeps the current position in sync with the persisted `idx` setting.
pub struct Session {
    genres: GenreList,
    store: RatingStore,
    position: usize,
    url_template: String,
}

impl Session {
    pub fn open(genres: GenreList, store: RatingStore, url_template: &str) -> Self {
        let position = resume_position(&genres, &store);
        Self {
            genres,
            store,
            position,
            url_template: url_template.to_string(),
        }
    }

    pub fn genres(&self) -> &GenreList {
        &self.genres
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_name(&self) -> Option<&str> {
        self.genres.get(self.position)
    }

    pub fn current_url(&self) -> Option<String> {
        self.current_name().map(|name| self.url_for(name))
    }

    pub fn url_for(&self, name: &str) -> String {
        reference_url(&self.url_template, name)
    }

    pub fn current_rating(&self) -> Option<&Rating> {
        self.store.get_rating(self.position)
    }

    /// Draft pre-filled from the stored rating at the current position
    pub fn draft(&self) -> Draft {
        self.current_rating()
            .map(Draft::from_rating)
            .unwrap_or_default()
    }

    /// Save `draft` as the complete rating for the current genre.
    ///
    /// Returns `None` without touching the store when there are no genres.
    pub fn save(&mut self, draft: &Draft) -> Result<Option<Rating>> {
        let Some(name) = self.current_name() else {
            return Ok(None);
        };

        let comment = draft.comment.trim();
        let rating = Rating {
            genre_id: self.position,
            name: name.to_string(),
            url: self.url_for(name),
            skip: draft.skip,
            kiff: draft.kiff,
            special: draft.special,
            flou: draft.flou,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
            updated_at: Some(Utc::now()),
        };

        self.store
            .set_rating(rating.clone())
            .with_context(|| format!("Failed to save rating for '{}'", rating.name))?;
        Ok(Some(rating))
    }

    /// Move to the next genre, wrapping at the end of the list
    pub fn advance(&mut self) -> Result<usize> {
        if self.genres.is_empty() {
            return Ok(self.position);
        }
        let next = (self.position + 1) % self.genres.len();
        self.move_to(next)
    }

    /// Jump to a genre id, clamped into the list
    pub fn jump_to(&mut self, genre_id: usize) -> Result<usize> {
        if self.genres.is_empty() {
            return Ok(self.position);
        }
        let target = self.genres.clamp_position(genre_id);
        self.move_to(target)
    }

    fn move_to(&mut self, idx: usize) -> Result<usize> {
        self.store
            .set_position(idx)
            .context("Failed to save browsing position")?;
        self.position = idx;
        Ok(idx)
    }

    /// Replace all ratings from a backup file, then re-read the position
    pub fn import_from_path(&mut self, path: &Path) -> Result<ImportReport, StoreError> {
        let report = self.store.import_from_path(path)?;
        self.reload_position();
        Ok(report)
    }

    pub fn import_str(&mut self, json: &str) -> Result<ImportReport, StoreError> {
        let report = self.store.import_str(json)?;
        self.reload_position();
        Ok(report)
    }

    fn reload_position(&mut self) {
        self.position = resume_position(&self.genres, &self.store);
    }

    pub fn ranking(&self, order: RankOrder) -> Vec<RankedGenre> {
        rank(&self.store.get_all_ratings(), order)
    }

    pub fn stats(&self) -> Stats {
        stats(&self.store.get_all_ratings())
    }
}

/// Saved position clamped into the genre list. A shrunken list is worth a warning.
fn resume_position(genres: &GenreList, store: &RatingStore) -> usize {
    let saved = store.position().unwrap_or(0);
    let position = genres.clamp_position(saved);
    if position != saved && !genres.is_empty() {
        crate::buffered_eprintln!(
            "Saved position {} is past the end of the genre list ({} genres), resuming at {}",
            saved,
            genres.len(),
            position
        );
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use crate::genres::DEFAULT_URL_TEMPLATE;

    fn temp_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "genre_rater_test_session_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn session(path: &Path) -> Session {
        let genres = GenreList::from_text("ambient\nNéo Soul\ndrone\n");
        let store = RatingStore::open(path).unwrap();
        Session::open(genres, store, DEFAULT_URL_TEMPLATE)
    }

    #[test]
    fn test_open_starts_at_zero() {
        let path = temp_path("start");
        let s = session(&path);
        assert_eq!(s.position(), 0);
        assert_eq!(s.current_name(), Some("ambient"));
        assert_eq!(s.draft(), Draft::default());
    }

    #[test]
    fn test_open_clamps_stored_position() {
        let path = temp_path("clamp");
        let mut store = RatingStore::open(&path).unwrap();
        store.set_position(42).unwrap();

        let s = Session::open(
            GenreList::from_text("a\nb\n"),
            store,
            DEFAULT_URL_TEMPLATE,
        );
        assert_eq!(s.position(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_import_past_end_resumes_at_last_genre() {
        let path = temp_path("import_past_end");
        let mut s = session(&path);
        let report = s
            .import_str(r#"{"idx": 40, "ratings": [{"genreId": 40, "skip": 1, "kiff": 1}]}"#)
            .unwrap();

        assert!(report.idx_restored);
        assert_eq!(s.store().position(), Some(40));
        assert_eq!(s.position(), 2);
        assert_eq!(s.current_name(), Some("drone"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_builds_complete_rating() {
        let path = temp_path("save");
        let mut s = session(&path);
        s.jump_to(1).unwrap();

        let draft = Draft {
            skip: Some(8),
            kiff: Some(4),
            special: false,
            flou: true,
            comment: "  late night  ".to_string(),
        };
        let rating = s.save(&draft).unwrap().unwrap();

        assert_eq!(rating.genre_id, 1);
        assert_eq!(rating.name, "Néo Soul");
        assert_eq!(rating.url, "https://everynoise.com/everynoise1d-neosoul.html");
        assert_eq!(rating.comment.as_deref(), Some("late night"));
        assert!(rating.updated_at.is_some());
        assert_eq!(s.store().get_rating(1), Some(&rating));
        assert_eq!(rating.score(), draft.score());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_blank_comment_is_none() {
        let path = temp_path("blank_comment");
        let mut s = session(&path);
        let rating = s
            .save(&Draft {
                comment: "   ".to_string(),
                ..Draft::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(rating.comment, None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_draft_reloads_saved_rating() {
        let path = temp_path("reload");
        let mut s = session(&path);
        let draft = Draft {
            skip: Some(3),
            kiff: Some(9),
            special: true,
            flou: false,
            comment: "odd one".to_string(),
        };
        s.save(&draft).unwrap();
        assert_eq!(s.draft(), draft);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_advance_wraps_and_persists() {
        let path = temp_path("advance");
        let mut s = session(&path);
        assert_eq!(s.advance().unwrap(), 1);
        assert_eq!(s.advance().unwrap(), 2);
        assert_eq!(s.advance().unwrap(), 0);
        assert_eq!(s.store().position(), Some(0));

        s.advance().unwrap();
        let reopened = RatingStore::open(&path).unwrap();
        assert_eq!(reopened.position(), Some(1));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_jump_to_clamps() {
        let path = temp_path("jump");
        let mut s = session(&path);
        assert_eq!(s.jump_to(99).unwrap(), 2);
        assert_eq!(s.current_name(), Some("drone"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_genre_list_is_inert() {
        let path = temp_path("empty");
        let store = RatingStore::open(&path).unwrap();
        let mut s = Session::open(GenreList::default(), store, DEFAULT_URL_TEMPLATE);

        assert_eq!(s.current_name(), None);
        assert_eq!(s.save(&Draft::default()).unwrap(), None);
        assert_eq!(s.advance().unwrap(), 0);
        assert!(s.store().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_import_refreshes_position() {
        let path = temp_path("import");
        let mut s = session(&path);
        let report = s
            .import_str(r#"{"version": 1, "idx": 2, "ratings": [{"genreId": 2, "skip": 10, "kiff": 10}]}"#)
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(s.position(), 2);
        assert_eq!(s.draft().skip, Some(10));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_ranking_and_stats_agree_with_live_score() {
        let path = temp_path("aggregate");
        let mut s = session(&path);
        let draft = Draft {
            skip: Some(8),
            kiff: Some(4),
            flou: true,
            ..Draft::default()
        };
        s.save(&draft).unwrap();
        s.advance().unwrap();
        s.save(&Draft {
            skip: Some(10),
            kiff: Some(10),
            special: true,
            ..Draft::default()
        })
        .unwrap();

        let ranked = s.ranking(RankOrder::Desc);
        assert_eq!(ranked.len(), 1);
        assert_eq!(Some(ranked[0].score), draft.score());

        let stats = s.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.special_count, 1);
        assert_eq!(stats.average, draft.score());

        let _ = fs::remove_file(&path);
    }
}
