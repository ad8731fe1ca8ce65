//! Derived info: what the album learns about its assets after loading.
//!
//! Video previews and durations come from the video files themselves, image
//! checks tell the grid which photos failed to load. Both tables are keyed by
//! canonical index and only written by the results of their background tasks.

use iced::widget::image::Handle;
use std::collections::HashMap;
use std::fmt;

use crate::media::thumbnail::Thumbnail;

/// Shown when a duration cannot be determined
pub const UNKNOWN_DURATION: &str = "unknown";

/// A video's playback length as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationLabel {
    Known { minutes: u64, seconds: u8 },
    Unknown,
}

impl fmt::Display for DurationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationLabel::Known { minutes, seconds } => write!(f, "{}:{:02}", minutes, seconds),
            DurationLabel::Unknown => f.write_str(UNKNOWN_DURATION),
        }
    }
}

/// Format a duration in seconds as `M:SS`.
///
/// Non-finite and negative inputs (streams with no known length) yield
/// `DurationLabel::Unknown` instead of an error.
pub fn format_duration(seconds: f64) -> DurationLabel {
    if !seconds.is_finite() || seconds < 0.0 {
        return DurationLabel::Unknown;
    }

    let total = seconds.floor() as u64;
    DurationLabel::Known {
        minutes: total / 60,
        seconds: (total % 60) as u8,
    }
}

/// Preview and duration derived from a video asset
#[derive(Debug, Clone)]
pub struct DerivedVideoInfo {
    pub thumbnail: Thumbnail,
    pub duration: DurationLabel,
}

impl DerivedVideoInfo {
    /// Result for a video whose asset could not be opened at all
    pub fn unavailable() -> Self {
        DerivedVideoInfo {
            thumbnail: Thumbnail::Placeholder,
            duration: DurationLabel::Unknown,
        }
    }
}

/// Terminal outcome of one derivation.
///
/// A video tile is Loading until its index has an entry in the table;
/// every derivation ends in one of these two states.
#[derive(Debug, Clone)]
pub enum Derivation {
    Ready(DerivedVideoInfo),
    Failed(DerivedVideoInfo),
}

impl Derivation {
    pub fn info(&self) -> &DerivedVideoInfo {
        match self {
            Derivation::Ready(info) | Derivation::Failed(info) => info,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Derivation::Failed(_))
    }
}

/// Derived video info keyed by canonical index
#[derive(Debug, Default)]
pub struct DerivedTable {
    entries: HashMap<usize, Derivation>,
}

impl DerivedTable {
    /// True while no derivation has finished for this index
    pub fn is_pending(&self, index: usize) -> bool {
        !self.entries.contains_key(&index)
    }

    pub fn info(&self, index: usize) -> Option<&DerivedVideoInfo> {
        self.entries.get(&index).map(Derivation::info)
    }

    /// Store a result. A repeated derivation for the same index overwrites it.
    pub fn record(&mut self, index: usize, derivation: Derivation) {
        self.entries.insert(index, derivation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Results of image asset checks keyed by canonical index.
/// `None` marks an image that failed to load.
#[derive(Debug, Default)]
pub struct ImageChecks {
    entries: HashMap<usize, Option<Handle>>,
}

impl ImageChecks {
    pub fn is_checked(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&Option<Handle>> {
        self.entries.get(&index)
    }

    pub fn record(&mut self, index: usize, handle: Option<Handle>) {
        self.entries.insert(index, handle);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
