use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Genre bucket for tracks that don't carry one
pub const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub artist_id: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_date: String, // ISO date or RFC 3339 timestamp, as the backend sends it
    #[serde(default)]
    pub plays: i64,
    #[serde(default)]
    pub likes: i64,

    // Display fields - the engine never looks at these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>, // seconds

    /// Anything else the catalog attaches, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    pub fn new(id: impl Into<String>, artist_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            artist_id: artist_id.into(),
            genre: None,
            release_date: String::new(),
            plays: 0,
            likes: 0,
            title: None,
            artist: None,
            cover_art: None,
            duration: None,
            extra: Map::new(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = release_date.into();
        self
    }

    pub fn with_counts(mut self, plays: i64, likes: i64) -> Self {
        self.plays = plays;
        self.likes = likes;
        self
    }

    /// Parse the release date. Accepts full RFC 3339 timestamps and bare
    /// `YYYY-MM-DD` dates (taken as midnight UTC). `None` when unparseable.
    pub fn released_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.release_date.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Genre bucket used for grouping; blank genres count as unknown
    pub fn genre_key(&self) -> &str {
        match self.genre.as_deref().map(str::trim) {
            Some(genre) if !genre.is_empty() => genre,
            _ => UNKNOWN_GENRE,
        }
    }

    /// Play counter clamped to zero
    pub fn play_total(&self) -> f64 {
        self.plays.max(0) as f64
    }

    /// Like counter clamped to zero
    pub fn like_total(&self) -> f64 {
        self.likes.max(0) as f64
    }

    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.clone())
    }

    pub fn display_artist(&self) -> String {
        self.artist
            .clone()
            .unwrap_or_else(|| "Unknown Artist".to_string())
    }
}
