use iced::widget::image::Handle;
use iced::widget::{
    button, center, column, container, horizontal_space, image, mouse_area, opaque, row, stack,
    text,
};
use iced::{Color, ContentFit, Element, Length};

use super::grid::image_handle;
use crate::site::Site;
use crate::state::data::MediaKind;
use crate::state::derived::{DerivedTable, ImageChecks};
use crate::state::library::Album;
use crate::state::viewer::{Lightbox, NavControls};
use crate::Message;

/// Duration text while the video is still being probed
pub const LOADING_DURATION: &str = "Loading…";

/// Text shown about the open record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalMeta {
    pub title: String,
    pub kind: MediaKind,
    pub date_label: String,
    /// Only for videos
    pub duration: Option<String>,
    pub description: String,
}

/// Image and video are mutually exclusive
#[derive(Debug, Clone)]
pub enum ModalMedia {
    Image(Handle),
    Video {
        poster: Option<Handle>,
        /// A real frame was captured and can be copied as a data URI
        copyable: bool,
        playing: bool,
    },
}

/// Everything the lightbox shows for the open record
#[derive(Debug, Clone)]
pub struct ModalView {
    pub meta: ModalMeta,
    pub media: ModalMedia,
    pub controls: NavControls,
    pub status: Option<String>,
}

/// Describe the open lightbox, or None when it is closed
pub fn present(
    album: &Album,
    lightbox: &Lightbox,
    derived: &DerivedTable,
    images: &ImageChecks,
    site: &Site,
    playing: Option<usize>,
) -> Option<ModalView> {
    let index = lightbox.current()?;
    let record = album.get(index)?;

    let (media, duration) = match record.kind {
        MediaKind::Image => (
            ModalMedia::Image(image_handle(images.get(index), site.resolve(&record.url))),
            None,
        ),
        MediaKind::Video => {
            let info = derived.info(index);
            (
                ModalMedia::Video {
                    poster: info.map(|info| info.thumbnail.handle()),
                    copyable: info.is_some_and(|info| !info.thumbnail.is_placeholder()),
                    playing: playing == Some(index),
                },
                Some(
                    info.map(|info| info.duration.to_string())
                        .unwrap_or_else(|| LOADING_DURATION.to_string()),
                ),
            )
        }
    };

    Some(ModalView {
        meta: ModalMeta {
            title: record.name.clone(),
            kind: record.kind,
            date_label: record.date_label(),
            duration,
            description: record.description.clone(),
        },
        media,
        controls: lightbox.controls(album.len()),
        status: None,
    })
}

/// Lay the lightbox over `base`.
/// Clicking the dimmed background closes it; clicks on the content do not.
pub fn overlay<'a>(base: Element<'a, Message>, modal: ModalView) -> Element<'a, Message> {
    stack![
        base,
        opaque(
            mouse_area(center(opaque(content(modal))).style(|_theme| container::Style {
                background: Some(Color { a: 0.85, ..Color::BLACK }.into()),
                ..container::Style::default()
            }))
            .on_press(Message::CloseModal)
        )
    ]
    .into()
}

fn content<'a>(modal: ModalView) -> Element<'a, Message> {
    let ModalView {
        meta,
        media,
        controls,
        status,
        ..
    } = modal;

    let header = row![
        text(meta.title).size(24),
        horizontal_space(),
        button(text("✕")).on_press(Message::CloseModal).style(button::text),
    ];

    let media: Element<'a, Message> = match media {
        ModalMedia::Image(handle) => image(handle)
            .width(Length::Fill)
            .height(Length::Fixed(480.0))
            .content_fit(ContentFit::Contain)
            .into(),
        ModalMedia::Video {
            poster,
            copyable,
            playing,
        } => {
            let poster: Element<'a, Message> = match poster {
                Some(handle) => image(handle)
                    .width(Length::Fill)
                    .height(Length::Fixed(420.0))
                    .content_fit(ContentFit::Contain)
                    .into(),
                None => container(text("Generating preview…"))
                    .center_x(Length::Fill)
                    .center_y(Length::Fixed(420.0))
                    .into(),
            };
            let label = if playing { "■ Stop" } else { "▶ Play" };
            column![
                poster,
                row![
                    button(text(label)).on_press(Message::TogglePlayback).padding(8),
                    button(text("Copy preview"))
                        .on_press_maybe(copyable.then_some(Message::CopyPreview))
                        .padding(8)
                        .style(button::secondary),
                ]
                .spacing(8),
            ]
            .spacing(8)
            .into()
        }
    };

    let mut details = row![
        text(meta.kind.label()).size(14),
        text(meta.date_label).size(14),
    ]
    .spacing(12);
    if let Some(duration) = meta.duration {
        details = details.push(text(format!("Duration: {}", duration)).size(14));
    }

    let navigation = row![
        button(text("‹ Prev")).on_press_maybe(controls.prev_enabled.then_some(Message::Prev)),
        horizontal_space(),
        button(text("Next ›")).on_press_maybe(controls.next_enabled.then_some(Message::Next)),
    ];

    let mut body = column![header, media, details, text(meta.description).size(15)].spacing(12);
    if let Some(status) = status {
        body = body.push(text(status).size(13));
    }
    body = body.push(navigation);

    container(body)
        .padding(20)
        .max_width(960)
        .style(container::rounded_box)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::thumbnail::Thumbnail;
    use crate::state::data::RawRecord;
    use crate::state::derived::{format_duration, Derivation, DerivedVideoInfo};

    fn raw(name: &str, date: &str, description: Option<&str>) -> RawRecord {
        RawRecord {
            url: format!("media/{}", name),
            name: name.to_string(),
            date: date.to_string(),
            description: description.map(str::to_string),
        }
    }

    fn album() -> Album {
        Album::from_sources(
            vec![
                raw("graduation", "2024-06-30", Some("Class photo")),
                raw("picnic", "2024-04-12", None),
            ],
            vec![raw("concert", "2024-05-20", None)],
            1,
        )
    }

    fn present_at(album: &Album, lightbox: &Lightbox, derived: &DerivedTable) -> Option<ModalView> {
        present(
            album,
            lightbox,
            derived,
            &ImageChecks::default(),
            &Site::parse("/srv/class"),
            None,
        )
    }

    #[test]
    fn test_closed_lightbox_presents_nothing() {
        let album = album();
        assert!(present_at(&album, &Lightbox::default(), &DerivedTable::default()).is_none());
    }

    #[test]
    fn test_image_metadata() {
        let album = album();
        let mut lightbox = Lightbox::default();
        lightbox.open(0, album.len());

        let modal = present_at(&album, &lightbox, &DerivedTable::default()).unwrap();

        assert_eq!(modal.meta.title, "graduation");
        assert_eq!(modal.meta.kind, MediaKind::Image);
        assert_eq!(modal.meta.date_label, "June 30, 2024");
        assert_eq!(modal.meta.duration, None);
        assert_eq!(modal.meta.description, "Class photo");
        assert!(matches!(modal.media, ModalMedia::Image(_)));
        assert!(!modal.controls.prev_enabled);
        assert!(modal.controls.next_enabled);
    }

    #[test]
    fn test_video_duration_loading_then_derived() {
        let album = album();
        let mut lightbox = Lightbox::default();
        lightbox.open(1, album.len());
        let mut derived = DerivedTable::default();

        let modal = present_at(&album, &lightbox, &derived).unwrap();
        assert_eq!(modal.meta.kind, MediaKind::Video);
        assert_eq!(modal.meta.duration.as_deref(), Some(LOADING_DURATION));
        assert_eq!(modal.meta.description, "");
        assert!(matches!(modal.media, ModalMedia::Video { poster: None, copyable: false, playing: false }));

        derived.record(
            1,
            Derivation::Ready(DerivedVideoInfo {
                thumbnail: Thumbnail::Placeholder,
                duration: format_duration(125.0),
            }),
        );

        let modal = present_at(&album, &lightbox, &derived).unwrap();
        assert_eq!(modal.meta.duration.as_deref(), Some("2:05"));
        assert!(matches!(
            modal.media,
            ModalMedia::Video { poster: Some(_), copyable: false, .. }
        ));
    }

    #[test]
    fn test_poster_is_keyed_by_canonical_index() {
        let album = album();
        let mut derived = DerivedTable::default();
        derived.record(1, Derivation::Failed(DerivedVideoInfo::unavailable()));

        let mut lightbox = Lightbox::default();
        lightbox.open(0, album.len());
        let modal = present_at(&album, &lightbox, &derived).unwrap();
        assert!(matches!(modal.media, ModalMedia::Image(_)));

        lightbox.next(album.len());
        let modal = present_at(&album, &lightbox, &derived).unwrap();
        assert_eq!(modal.meta.duration.as_deref(), Some("unknown"));
        assert!(matches!(modal.media, ModalMedia::Video { poster: Some(_), .. }));
    }

    #[test]
    fn test_next_then_prev_restores_metadata() {
        let album = album();
        let mut lightbox = Lightbox::default();
        lightbox.open(1, album.len());
        let before = present_at(&album, &lightbox, &DerivedTable::default()).unwrap();

        assert!(lightbox.next(album.len()));
        let moved = present_at(&album, &lightbox, &DerivedTable::default()).unwrap();
        assert_ne!(moved.meta, before.meta);

        assert!(lightbox.prev());
        let after = present_at(&album, &lightbox, &DerivedTable::default()).unwrap();
        assert_eq!(lightbox.current(), Some(1));
        assert_eq!(after.meta, before.meta);
        assert_eq!(after.controls, before.controls);
    }

    #[test]
    fn test_playing_flag_follows_index() {
        let album = album();
        let mut lightbox = Lightbox::default();
        lightbox.open(1, album.len());

        let modal = present(
            &album,
            &lightbox,
            &DerivedTable::default(),
            &ImageChecks::default(),
            &Site::parse("/srv/class"),
            Some(1),
        )
        .unwrap();
        assert!(matches!(modal.media, ModalMedia::Video { playing: true, .. }));
    }
}
