//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the data files, the album state and the UI layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// What kind of asset a record points at.
/// Not present in the data files; assigned from the file it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Tag shown next to the title in the viewer
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "Photo",
            MediaKind::Video => "Video",
        }
    }
}

/// One entry as it appears in `photos.json` or `videos.json`
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub url: String,
    #[serde(default)]
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A photo or video in the album
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub kind: MediaKind,
    /// Asset location, relative to the site base or absolute http(s)
    pub url: String,
    /// Display title
    pub name: String,
    /// Date exactly as written in the data file
    pub date: String,
    /// Empty when the data file has none
    pub description: String,
    /// Parsed `date`, None if it could not be parsed
    pub taken_at: Option<NaiveDateTime>,
}

impl MediaRecord {
    pub fn from_raw(raw: RawRecord, kind: MediaKind) -> Self {
        let taken_at = parse_date(&raw.date);
        MediaRecord {
            kind,
            url: raw.url,
            name: raw.name,
            date: raw.date,
            description: raw.description.unwrap_or_default(),
            taken_at,
        }
    }

    /// Human readable date, e.g. "June 1, 2024".
    /// Falls back to the raw string when the date did not parse.
    pub fn date_label(&self) -> String {
        match self.taken_at {
            Some(taken_at) => taken_at.format("%B %-d, %Y").to_string(),
            None => self.date.clone(),
        }
    }
}

/// Parse the ISO-like dates used by the data files.
///
/// Accepts `2024-06-01`, `2024/06/01`, RFC 3339 timestamps and
/// `2024-06-01 10:30:00` / `2024-06-01T10:30:00`.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp);
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// View-level predicate over the album. Never changes the album itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Image,
    Video,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Image, Filter::Video];

    pub fn matches(self, kind: MediaKind) -> bool {
        match self {
            Filter::All => true,
            Filter::Image => kind == MediaKind::Image,
            Filter::Video => kind == MediaKind::Video,
        }
    }

    /// Button caption in the filter bar
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Image => "Photos",
            Filter::Video => "Videos",
        }
    }
}
