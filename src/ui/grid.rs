use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, Space};
use iced::{ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::media::thumbnail::placeholder_handle;
use crate::site::{AssetLocation, Site};
use crate::state::data::{Filter, MediaKind};
use crate::state::derived::{DerivedTable, ImageChecks};
use crate::state::library::Album;
use crate::Message;

const TILE_WIDTH: f32 = 220.0;
const TILE_HEIGHT: f32 = 150.0;

/// Duration shown before a video has been probed
const PENDING_DURATION: &str = "--:--";

pub const EMPTY_ALBUM: &str = "No media yet";
pub const EMPTY_FILTER: &str = "Nothing in this category";

/// What the grid shows for the active filter
#[derive(Debug, Clone)]
pub enum GridView {
    Tiles(Vec<Tile>),
    /// Explicit placeholder instead of an empty grid
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct Tile {
    /// Canonical index, used to open the viewer
    pub index: usize,
    pub name: String,
    pub date_label: String,
    pub visual: TileVisual,
}

#[derive(Debug, Clone)]
pub enum TileVisual {
    Image(Handle),
    VideoLoading,
    Video { preview: Handle, duration: String },
}

impl GridView {
    pub fn tiles(&self) -> &[Tile] {
        match self {
            GridView::Tiles(tiles) => tiles,
            GridView::Empty(_) => &[],
        }
    }
}

/// Build the grid for `filter`. Tiles keep their canonical index.
pub fn layout(
    album: &Album,
    filter: Filter,
    derived: &DerivedTable,
    images: &ImageChecks,
    site: &Site,
) -> GridView {
    if album.is_empty() {
        return GridView::Empty(EMPTY_ALBUM);
    }

    let tiles: Vec<Tile> = album
        .iter()
        .filter(|(_, record)| filter.matches(record.kind))
        .map(|(index, record)| {
            let visual = match record.kind {
                MediaKind::Image => TileVisual::Image(image_handle(
                    images.get(index),
                    site.resolve(&record.url),
                )),
                MediaKind::Video => match derived.info(index) {
                    Some(info) => TileVisual::Video {
                        preview: info.thumbnail.handle(),
                        duration: info.duration.to_string(),
                    },
                    None => TileVisual::VideoLoading,
                },
            };

            Tile {
                index,
                name: record.name.clone(),
                date_label: record.date_label(),
                visual,
            }
        })
        .collect();

    if tiles.is_empty() {
        GridView::Empty(EMPTY_FILTER)
    } else {
        GridView::Tiles(tiles)
    }
}

/// Handle for a photo: checked result if there is one, else straight from
/// disk. Failed and not-yet-downloaded remote photos show the placeholder.
pub fn image_handle(check: Option<&Option<Handle>>, location: AssetLocation) -> Handle {
    match (check, location) {
        (Some(Some(handle)), _) => handle.clone(),
        (Some(None), _) => placeholder_handle(),
        (None, AssetLocation::Local(path)) => Handle::from_path(path),
        (None, AssetLocation::Remote(_)) => placeholder_handle(),
    }
}

pub fn view<'a>(grid: GridView) -> Element<'a, Message> {
    let tiles = match grid {
        GridView::Empty(message) => {
            return container(text(message).size(18))
                .padding(40)
                .center_x(Length::Fill)
                .into();
        }
        GridView::Tiles(tiles) => tiles,
    };

    let elements: Vec<Element<'a, Message>> = tiles.into_iter().map(tile).collect();

    scrollable(
        container(Wrap::with_elements(elements).spacing(12.0).line_spacing(12.0))
            .padding(16)
            .width(Length::Fill),
    )
    .height(Length::Fill)
    .into()
}

fn tile<'a>(tile: Tile) -> Element<'a, Message> {
    let (preview, duration): (Element<'a, Message>, Option<String>) = match tile.visual {
        TileVisual::Image(handle) => (preview_image(handle), None),
        TileVisual::VideoLoading => (
            container(text("Generating preview…").size(14))
                .center_x(Length::Fixed(TILE_WIDTH))
                .center_y(Length::Fixed(TILE_HEIGHT))
                .style(container::rounded_box)
                .into(),
            Some(PENDING_DURATION.to_string()),
        ),
        TileVisual::Video { preview, duration } => (preview_image(preview), Some(duration)),
    };

    let meta = match duration {
        Some(duration) => row![
            text(tile.date_label).size(12),
            Space::with_width(Length::Fill),
            text(format!("▶ {}", duration)).size(12),
        ],
        None => row![text(tile.date_label).size(12)],
    };

    let content = column![preview, text(tile.name).size(15), meta]
        .spacing(4)
        .width(Length::Fixed(TILE_WIDTH));

    button(content)
        .on_press(Message::TileClicked(tile.index))
        .style(button::text)
        .padding(6)
        .into()
}

fn preview_image<'a>(handle: Handle) -> Element<'a, Message> {
    image(handle)
        .width(Length::Fixed(TILE_WIDTH))
        .height(Length::Fixed(TILE_HEIGHT))
        .content_fit(ContentFit::Cover)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::thumbnail::Thumbnail;
    use crate::state::data::RawRecord;
    use crate::state::derived::{format_duration, Derivation, DerivedVideoInfo};

    fn raw(name: &str, date: &str) -> RawRecord {
        RawRecord {
            url: format!("media/{}", name),
            name: name.to_string(),
            date: date.to_string(),
            description: None,
        }
    }

    fn site() -> Site {
        Site::parse("/srv/class")
    }

    fn album() -> Album {
        Album::from_sources(
            vec![
                raw("p1", "2024-03-01"),
                raw("p2", "2023-11-11"),
                raw("p3", "2024-05-20"),
            ],
            vec![raw("v1", "2024-04-01"), raw("v2", "2022-01-01")],
            1,
        )
    }

    fn count(album: &Album, filter: Filter) -> usize {
        layout(album, filter, &DerivedTable::default(), &ImageChecks::default(), &site())
            .tiles()
            .len()
    }

    #[test]
    fn test_tile_counts_per_filter() {
        let album = album();
        assert_eq!(count(&album, Filter::All), 5);
        assert_eq!(count(&album, Filter::Image), 3);
        assert_eq!(count(&album, Filter::Video), 2);
    }

    #[test]
    fn test_filtered_tiles_keep_canonical_index() {
        let album = Album::from_sources(
            vec![raw("photo", "2024-01-01")],
            vec![raw("video", "2024-06-01")],
            1,
        );

        let all = layout(&album, Filter::All, &DerivedTable::default(), &ImageChecks::default(), &site());
        assert_eq!(all.tiles().len(), 2);

        let photos = layout(&album, Filter::Image, &DerivedTable::default(), &ImageChecks::default(), &site());
        let tiles = photos.tiles();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].name, "photo");
        assert_eq!(tiles[0].index, 1);

        let videos = layout(&album, Filter::Video, &DerivedTable::default(), &ImageChecks::default(), &site());
        assert_eq!(videos.tiles()[0].index, 0);
    }

    #[test]
    fn test_empty_album_shows_message() {
        let album = Album::from_sources(vec![], vec![], 1);
        let grid = layout(&album, Filter::All, &DerivedTable::default(), &ImageChecks::default(), &site());
        assert!(matches!(grid, GridView::Empty(EMPTY_ALBUM)));
    }

    #[test]
    fn test_empty_filter_shows_message() {
        let album = Album::from_sources(vec![raw("p", "2024-01-01")], vec![], 1);
        let grid = layout(&album, Filter::Video, &DerivedTable::default(), &ImageChecks::default(), &site());
        assert!(matches!(grid, GridView::Empty(EMPTY_FILTER)));
    }

    #[test]
    fn test_video_tile_leaves_loading_once_derived() {
        let album = Album::from_sources(vec![], vec![raw("v", "2024-01-01")], 1);
        let mut derived = DerivedTable::default();

        let grid = layout(&album, Filter::All, &derived, &ImageChecks::default(), &site());
        assert!(matches!(grid.tiles()[0].visual, TileVisual::VideoLoading));

        derived.record(
            0,
            Derivation::Ready(DerivedVideoInfo {
                thumbnail: Thumbnail::Placeholder,
                duration: format_duration(65.0),
            }),
        );

        let grid = layout(&album, Filter::All, &derived, &ImageChecks::default(), &site());
        match &grid.tiles()[0].visual {
            TileVisual::Video { duration, .. } => assert_eq!(duration, "1:05"),
            other => panic!("expected a derived video tile, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_video_shows_unknown() {
        let album = Album::from_sources(vec![], vec![raw("v", "2024-01-01")], 1);
        let mut derived = DerivedTable::default();
        derived.record(0, Derivation::Failed(DerivedVideoInfo::unavailable()));

        let grid = layout(&album, Filter::Video, &derived, &ImageChecks::default(), &site());
        match &grid.tiles()[0].visual {
            TileVisual::Video { duration, .. } => assert_eq!(duration, "unknown"),
            other => panic!("expected a derived video tile, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_image_uses_placeholder() {
        let handle = image_handle(Some(&None), AssetLocation::Local("/srv/class/media/a.jpg".into()));
        assert_eq!(handle.id(), placeholder_handle().id());

        let handle = image_handle(None, AssetLocation::Remote("https://example.com/a.jpg".into()));
        assert_eq!(handle.id(), placeholder_handle().id());
    }
}
