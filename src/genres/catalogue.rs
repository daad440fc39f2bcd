use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default genre list path (~/.config/genre-rater/genres.txt)
pub fn get_genres_path() -> PathBuf {
    crate::config::get_config_dir().join("genres.txt")
}

/// The fixed, ordered list of genres to rate.
///
/// A genre's id is its zero-based position in the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreList {
    names: Vec<String>,
}

impl GenreList {
    /// Build from newline-delimited text, trimming lines and dropping blanks
    pub fn from_text(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read genre list at {}", path.display()))?;
        Ok(Self::from_text(&text))
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }

    /// Clamp a stored position into the list's bounds
    pub fn clamp_position(&self, idx: usize) -> usize {
        idx.min(self.names.len().saturating_sub(1))
    }

    /// Case-insensitive substring search, returning at most `limit` matches
    pub fn search(&self, query: &str, limit: usize) -> Vec<(usize, &str)> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.iter()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn sample() -> GenreList {
        GenreList::from_text("pop\n  rock \n\nacid jazz\nJazz Fusion\r\nnu jazz\n")
    }

    #[test]
    fn test_from_text_trims_and_drops_blank_lines() {
        let genres = sample();
        assert_eq!(genres.len(), 5);
        assert_eq!(genres.get(0), Some("pop"));
        assert_eq!(genres.get(1), Some("rock"));
        assert_eq!(genres.get(2), Some("acid jazz"));
        assert_eq!(genres.get(3), Some("Jazz Fusion"));
        assert_eq!(genres.get(5), None);
    }

    #[test]
    fn test_clamp_position() {
        let genres = sample();
        assert_eq!(genres.clamp_position(0), 0);
        assert_eq!(genres.clamp_position(4), 4);
        assert_eq!(genres.clamp_position(99), 4);
        assert_eq!(GenreList::default().clamp_position(3), 0);
    }

    #[test]
    fn test_search_case_insensitive() {
        let genres = sample();
        let results = genres.search("JAZZ", 200);
        assert_eq!(results, vec![(2, "acid jazz"), (3, "Jazz Fusion"), (4, "nu jazz")]);
    }

    #[test]
    fn test_search_respects_limit() {
        let genres = sample();
        assert_eq!(genres.search("jazz", 2).len(), 2);
    }

    #[test]
    fn test_search_blank_query_is_empty() {
        let genres = sample();
        assert!(genres.search("", 200).is_empty());
        assert!(genres.search("   ", 200).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join(format!("genre_rater_test_genres_{}.txt", std::process::id()));
        fs::write(&path, "ambient\ndrone\n").unwrap();

        let genres = GenreList::load(&path).unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres.get(1), Some("drone"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = env::temp_dir().join("genre_rater_test_no_such_genres.txt");
        let _ = fs::remove_file(&path);
        let err = GenreList::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read genre list"));
    }
}
