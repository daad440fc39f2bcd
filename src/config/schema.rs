use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::genres::DEFAULT_URL_TEMPLATE;

pub const DEFAULT_RANK_LIMIT: usize = 100;
pub const DEFAULT_SEARCH_LIMIT: usize = 200;

/// Main configuration, read from `~/.config/genre-rater/config.yaml`.
///
/// Every key is optional:
/// ```yaml
/// genres_file: /home/me/music/genres.txt
/// data_file: /home/me/music/ratings.json
/// reference_url_template: "https://everynoise.com/everynoise1d-{slug}.html"
/// rank_limit: 100
/// search_limit: 200
/// theme: auto
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Newline-delimited genre list (default: genres.txt next to the config)
    #[serde(default)]
    pub genres_file: Option<PathBuf>,

    /// Ratings store (default: ratings.json next to the config)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Reference page template, `{slug}` is replaced by the genre slug
    #[serde(default)]
    pub reference_url_template: Option<String>,

    /// How many ranked genres to show
    #[serde(default = "default_rank_limit")]
    pub rank_limit: usize,

    /// Maximum number of search matches
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default)]
    pub theme: ThemeMode,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Pick from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

fn default_rank_limit() -> usize {
    DEFAULT_RANK_LIMIT
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genres_file: None,
            data_file: None,
            reference_url_template: None,
            rank_limit: DEFAULT_RANK_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            theme: ThemeMode::Auto,
        }
    }
}

impl Config {
    pub fn genres_path(&self) -> PathBuf {
        self.genres_file
            .clone()
            .unwrap_or_else(crate::genres::get_genres_path)
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(crate::store::get_data_path)
    }

    pub fn url_template(&self) -> &str {
        self.reference_url_template
            .as_deref()
            .unwrap_or(DEFAULT_URL_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rank_limit, 100);
        assert_eq!(config.search_limit, 200);
        assert_eq!(config.theme, ThemeMode::Auto);
        assert_eq!(config.url_template(), DEFAULT_URL_TEMPLATE);
        assert!(config.genres_path().ends_with("genres.txt"));
        assert!(config.data_path().ends_with("ratings.json"));
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
genres_file: /tmp/genres.txt
data_file: /tmp/ratings.json
reference_url_template: "https://example.org/{slug}"
rank_limit: 25
search_limit: 50
theme: light
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.genres_path(), PathBuf::from("/tmp/genres.txt"));
        assert_eq!(config.data_path(), PathBuf::from("/tmp/ratings.json"));
        assert_eq!(config.url_template(), "https://example.org/{slug}");
        assert_eq!(config.rank_limit, 25);
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.theme, ThemeMode::Light);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            genres_file: Some(PathBuf::from("/data/genres.txt")),
            theme: ThemeMode::Dark,
            ..Config::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
