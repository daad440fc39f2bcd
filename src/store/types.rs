use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::score::{clamp_sub_score, compute_score};

/// Schema version written into backup snapshots
pub const SNAPSHOT_VERSION: u32 = 1;

/// Schema version of the on-disk store file
pub const STORE_VERSION: u32 = 1;

/// Meta key holding the last browsed genre position
pub const META_IDX: &str = "idx";

/// A user's rating of one genre. At most one exists per `genre_id`.
///
/// Decoding is lenient so backups written by older or foreign tools still
/// load: only `genreId` must be an integer, other badly typed fields fall
/// back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(deserialize_with = "de_genre_id")]
    pub genre_id: usize,
    /// Genre name as it was when the rating was saved
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    /// Reference link, derived from the name
    #[serde(default, deserialize_with = "de_string")]
    pub url: String,
    #[serde(default, deserialize_with = "de_sub_score")]
    pub skip: Option<u8>,
    #[serde(default, deserialize_with = "de_sub_score")]
    pub kiff: Option<u8>,
    #[serde(default, deserialize_with = "de_flag")]
    pub special: bool,
    #[serde(default, deserialize_with = "de_flag")]
    pub flou: bool,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A non-negative integer-valued number as a genre id. `3` and `3.0` both count.
pub fn genre_index(value: &Value) -> Option<usize> {
    if let Some(id) = value.as_u64() {
        return usize::try_from(id).ok();
    }
    let id = value.as_f64()?;
    if id < 0.0 || id.fract() != 0.0 || id > u64::MAX as f64 {
        return None;
    }
    usize::try_from(id as u64).ok()
}

fn de_genre_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    genre_index(&value).ok_or_else(|| D::Error::custom(format!("invalid genreId {}", value)))
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn de_sub_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .as_f64()
        .and_then(clamp_sub_score))
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// RFC 3339 text, or a number of epoch milliseconds
fn de_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

impl Rating {
    /// Create an empty rating for a genre
    pub fn new(genre_id: usize, name: impl Into<String>) -> Self {
        Self {
            genre_id,
            name: name.into(),
            url: String::new(),
            skip: None,
            kiff: None,
            special: false,
            flou: false,
            comment: None,
            updated_at: None,
        }
    }

    /// Derived score, `None` when special or incomplete
    pub fn score(&self) -> Option<f64> {
        compute_score(self.skip, self.kiff, self.special, self.flou)
    }
}

/// Export/import payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub idx: usize,
    pub ratings: Vec<Rating>,
}

/// Outcome of a snapshot import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub idx_restored: bool,
}

/// On-disk layout of the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoreFile {
    pub version: u32,
    #[serde(default)]
    pub ratings: BTreeMap<usize, Rating>,
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            ratings: BTreeMap::new(),
            meta: BTreeMap::new(),
        }
    }
}
