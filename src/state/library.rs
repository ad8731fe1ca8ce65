use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;

use super::data::{MediaKind, MediaRecord, RawRecord};
use crate::site::{FetchCause, Site};

/// The two data files the album is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Photos,
    Videos,
}

impl DataSource {
    pub fn file_name(self) -> &'static str {
        match self {
            DataSource::Photos => "photos.json",
            DataSource::Videos => "videos.json",
        }
    }

    fn kind(self) -> MediaKind {
        match self {
            DataSource::Photos => MediaKind::Image,
            DataSource::Videos => MediaKind::Video,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Photos => f.write_str("photos"),
            DataSource::Videos => f.write_str("videos"),
        }
    }
}

/// Loading failed for one of the data files
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load {collection} ({}): {cause}", .collection.file_name())]
pub struct LoadError {
    pub collection: DataSource,
    #[source]
    pub cause: FetchCause,
}

/// The canonical collection: every photo and video, newest first.
///
/// A record's position is its identity for the rest of the session. Filters,
/// derived thumbnails and the viewer all refer to records by this index.
/// The album is only ever replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Album {
    records: Vec<MediaRecord>,
    /// Which load produced this album
    generation: u64,
}

impl Album {
    /// Tag, merge and sort the two collections.
    ///
    /// The sort is stable: records with equal dates keep photos before videos,
    /// then file order. Records with unparseable dates go last.
    pub fn from_sources(photos: Vec<RawRecord>, videos: Vec<RawRecord>, generation: u64) -> Self {
        let mut records: Vec<MediaRecord> = photos
            .into_iter()
            .map(|raw| MediaRecord::from_raw(raw, MediaKind::Image))
            .chain(
                videos
                    .into_iter()
                    .map(|raw| MediaRecord::from_raw(raw, MediaKind::Video)),
            )
            .collect();

        records.sort_by(|a, b| newest_first(a.taken_at, b.taken_at));

        Album {
            records,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaRecord> {
        self.records.get(index)
    }

    /// Records with their canonical index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &MediaRecord)> {
        self.records.iter().enumerate()
    }

    pub fn count(&self, kind: MediaKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

fn newest_first(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fetch both data files and build the album.
///
/// Both files are requested concurrently; nothing is returned until both
/// have arrived.
pub async fn load(site: Site, generation: u64) -> Result<Album, LoadError> {
    log::info!("🔍 Loading album from {}", site);

    let (photos, videos) = tokio::join!(
        fetch_records(&site, DataSource::Photos),
        fetch_records(&site, DataSource::Videos),
    );

    let album = Album::from_sources(photos?, videos?, generation);

    log::info!(
        "✅ Album loaded: {} photos, {} videos",
        album.count(MediaKind::Image),
        album.count(MediaKind::Video)
    );

    Ok(album)
}

async fn fetch_records(site: &Site, collection: DataSource) -> Result<Vec<RawRecord>, LoadError> {
    let location = site.data_file(collection.file_name());

    let bytes = location
        .read()
        .await
        .map_err(|cause| LoadError { collection, cause })?;

    let records: Vec<RawRecord> =
        serde_json::from_slice(&bytes).map_err(|e| LoadError {
            collection,
            cause: FetchCause::Json(e.to_string()),
        })?;

    log::debug!(
        "Read {} {} records from {}",
        records.len(),
        collection.kind().label(),
        location
    );

    Ok(records)
}
