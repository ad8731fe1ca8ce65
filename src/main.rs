use iced::keyboard::{self, key::Named, Key};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::time::Duration;

mod config;
mod media;
mod site;
mod state;
mod ui;

use config::AlbumConfig;
use media::playback::VideoPlayback;
use media::{check, probe};
use site::{AssetLocation, Site};
use state::data::{Filter, MediaKind};
use state::derived::{Derivation, DerivedTable, ImageChecks};
use state::library::{self, Album, LoadError};
use state::viewer::{Lightbox, LightboxAction};

/// Where the album is in its load cycle
#[derive(Debug)]
enum Phase {
    Loading,
    Failed(LoadError),
    Ready,
}

/// Main application state
struct ClassAlbum {
    config: AlbumConfig,
    site: Site,
    phase: Phase,
    /// Canonical collection; replaced wholesale on reload
    album: Album,
    filter: Filter,
    derived: DerivedTable,
    images: ImageChecks,
    lightbox: Lightbox,
    playback: VideoPlayback,
    /// Last playback problem, shown in the lightbox
    playback_status: Option<String>,
    /// Bumped on every load; stale results are dropped
    generation: u64,
}

/// How often a running player is checked for having exited
const PLAYBACK_POLL: Duration = Duration::from_millis(500);

/// Background work a visible tile still needs
#[derive(Debug, Clone, PartialEq, Eq)]
enum Enhancement {
    Derive { index: usize, location: AssetLocation },
    Check { index: usize, location: AssetLocation },
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Both data files arrived, or one of them failed
    Loaded {
        generation: u64,
        result: Result<Album, LoadError>,
    },
    /// User asked to fetch the data files again
    Reload,
    /// User clicked "Open site…"
    OpenSite,
    FilterSelected(Filter),
    /// A video derivation finished
    Derived {
        generation: u64,
        index: usize,
        derivation: Derivation,
    },
    /// An image asset check finished; None means it failed
    ImageChecked {
        generation: u64,
        index: usize,
        handle: Option<Handle>,
    },
    TileClicked(usize),
    CloseModal,
    Prev,
    Next,
    TogglePlayback,
    /// Periodic check on the external player
    PlaybackTick,
    /// Copy the open video's preview frame as a data URI
    CopyPreview,
    Key(Named),
}

impl ClassAlbum {
    fn new() -> (Self, Task<Message>) {
        let mut app = ClassAlbum::with_config(AlbumConfig::load());
        log::info!("🎨 Class album starting with site {}", app.site);

        let task = app.reload();
        (app, task)
    }

    /// Empty state for `config`. Nothing is loaded until `reload`.
    fn with_config(config: AlbumConfig) -> Self {
        let site = Site::parse(&config.site);

        ClassAlbum {
            filter: config.filter,
            playback: VideoPlayback::new(config.player.clone()),
            config,
            site,
            phase: Phase::Loading,
            album: Album::default(),
            derived: DerivedTable::default(),
            images: ImageChecks::default(),
            lightbox: Lightbox::default(),
            playback_status: None,
            generation: 0,
        }
    }

    /// Start a fresh load. Everything tied to the previous album is discarded.
    fn reload(&mut self) -> Task<Message> {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.album = Album::default();
        self.derived.clear();
        self.images.clear();
        self.lightbox.close();
        self.stop_playback();

        let generation = self.generation;
        Task::perform(library::load(self.site.clone(), generation), move |result| {
            Message::Loaded { generation, result }
        })
    }

    /// Derivations and asset checks the tiles of the current filter still
    /// need. Tiles that already have a result are skipped.
    fn pending_work(&self) -> Vec<Enhancement> {
        self.album
            .iter()
            .filter(|(_, record)| self.filter.matches(record.kind))
            .filter_map(|(index, record)| {
                let location = self.site.resolve(&record.url);
                match record.kind {
                    MediaKind::Video if self.derived.is_pending(index) => {
                        Some(Enhancement::Derive { index, location })
                    }
                    MediaKind::Image if !self.images.is_checked(index) => {
                        Some(Enhancement::Check { index, location })
                    }
                    _ => None,
                }
            })
            .collect()
    }

    fn enhance_visible(&self) -> Task<Message> {
        let generation = self.album.generation();
        let settings = self.config.derive_settings();

        let tasks: Vec<Task<Message>> = self
            .pending_work()
            .into_iter()
            .map(|work| match work {
                Enhancement::Derive { index, location } => Task::perform(
                    probe::derive(settings.clone(), location),
                    move |derivation| Message::Derived {
                        generation,
                        index,
                        derivation,
                    },
                ),
                Enhancement::Check { index, location } => Task::perform(
                    check::check_image(location),
                    move |handle| Message::ImageChecked {
                        generation,
                        index,
                        handle,
                    },
                ),
            })
            .collect();

        log::debug!("🖼️  Enhancing {} tiles", tasks.len());
        Task::batch(tasks)
    }

    fn stop_playback(&mut self) {
        self.playback.stop();
        self.playback_status = None;
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded { generation, .. } if generation != self.generation => {
                log::debug!("Dropping result of load {}", generation);
                Task::none()
            }
            Message::Loaded { result, .. } => match result {
                Ok(album) => {
                    self.album = album;
                    self.phase = Phase::Ready;
                    self.enhance_visible()
                }
                Err(err) => {
                    log::error!("❌ {}", err);
                    self.phase = Phase::Failed(err);
                    Task::none()
                }
            },
            Message::Reload => self.reload(),
            Message::OpenSite => {
                let folder = FileDialog::new()
                    .set_title("Select the class website folder")
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        self.site = Site::Directory(folder);
                        self.reload()
                    }
                    None => Task::none(),
                }
            }
            Message::FilterSelected(filter) => {
                self.filter = filter;
                self.enhance_visible()
            }
            Message::Derived {
                generation,
                index,
                derivation,
            } => {
                if generation != self.generation {
                    return Task::none();
                }
                if derivation.is_failed() {
                    log::debug!("Video #{} has no preview", index);
                }
                self.derived.record(index, derivation);
                log::debug!("🎞️  {} videos derived", self.derived.len());
                Task::none()
            }
            Message::ImageChecked {
                generation,
                index,
                handle,
            } => {
                if generation == self.generation {
                    self.images.record(index, handle);
                }
                Task::none()
            }
            Message::TileClicked(index) => {
                self.stop_playback();
                self.lightbox.open(index, self.album.len());
                Task::none()
            }
            Message::CloseModal => {
                self.apply(LightboxAction::Close);
                Task::none()
            }
            Message::Prev => {
                self.apply(LightboxAction::Prev);
                Task::none()
            }
            Message::Next => {
                self.apply(LightboxAction::Next);
                Task::none()
            }
            Message::Key(key) => {
                if let Some(action) = self.lightbox.action_for_key(key) {
                    self.apply(action);
                }
                Task::none()
            }
            Message::TogglePlayback => {
                self.toggle_playback();
                Task::none()
            }
            Message::PlaybackTick => {
                self.playback.refresh();
                Task::none()
            }
            Message::CopyPreview => {
                let uri = self
                    .lightbox
                    .current()
                    .and_then(|index| self.derived.info(index))
                    .and_then(|info| info.thumbnail.data_uri());

                match uri {
                    Some(uri) => iced::clipboard::write(uri),
                    None => Task::none(),
                }
            }
        }
    }

    /// Close or step the lightbox. Whatever was playing stops when the
    /// shown item changes.
    fn apply(&mut self, action: LightboxAction) {
        if self.lightbox.apply(action, self.album.len()) {
            self.stop_playback();
        }
    }

    fn toggle_playback(&mut self) {
        self.playback.refresh();

        let Some(index) = self.lightbox.current() else {
            return;
        };

        if self.playback.playing() == Some(index) {
            self.stop_playback();
            return;
        }

        let Some(record) = self.album.get(index) else {
            return;
        };
        if record.kind != MediaKind::Video {
            return;
        }

        let location = self.site.resolve(&record.url);
        match self.playback.play(index, &location) {
            Ok(()) => self.playback_status = None,
            Err(err) => {
                log::warn!("⚠️  {}", err);
                self.playback_status = Some(err.to_string());
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let (body, shown) = match &self.phase {
            Phase::Loading => (ui::loading_panel(&self.site), None),
            Phase::Failed(err) => (ui::error_panel(err, &self.site), None),
            Phase::Ready => {
                let grid = ui::grid::layout(
                    &self.album,
                    self.filter,
                    &self.derived,
                    &self.images,
                    &self.site,
                );
                let shown = grid.tiles().len();
                (ui::grid::view(grid), Some(shown))
            }
        };

        let base: Element<'_, Message> = column![self.toolbar(shown), body]
            .width(Length::Fill)
            .height(Length::Fill)
            .into();

        let modal = ui::modal::present(
            &self.album,
            &self.lightbox,
            &self.derived,
            &self.images,
            &self.site,
            self.playback.playing(),
        );

        match modal {
            Some(mut modal) => {
                modal.status = self.playback_status.clone();
                ui::modal::overlay(base, modal)
            }
            None => base,
        }
    }

    /// `shown` is the number of tiles in the grid, once the album is loaded
    fn toolbar(&self, shown: Option<usize>) -> Element<'_, Message> {
        let filters = Filter::ALL.iter().fold(row![].spacing(6), |bar, &filter| {
            let style: fn(&Theme, button::Status) -> button::Style = if filter == self.filter {
                button::primary
            } else {
                button::secondary
            };
            bar.push(
                button(text(filter.label()))
                    .on_press(Message::FilterSelected(filter))
                    .style(style),
            )
        });

        let summary = match shown {
            Some(shown) => format!(
                "{} of {} shown · {} photos · {} videos",
                shown,
                self.album.len(),
                self.album.count(MediaKind::Image),
                self.album.count(MediaKind::Video)
            ),
            None => String::new(),
        };

        container(
            row![
                text("Class Album").size(24),
                filters,
                horizontal_space(),
                text(summary).size(14),
                button("Reload").on_press(Message::Reload).style(button::text),
                button("Open site…").on_press(Message::OpenSite),
            ]
            .spacing(16)
            .align_y(Alignment::Center),
        )
        .padding(12)
        .width(Length::Fill)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key {
            Key::Named(named) => Some(Message::Key(named)),
            _ => None,
        });

        // ffplay exits by itself at the end of the video
        if self.playback.playing().is_some() {
            Subscription::batch([
                keys,
                iced::time::every(PLAYBACK_POLL).map(|_| Message::PlaybackTick),
            ])
        } else {
            keys
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Class Album", ClassAlbum::update, ClassAlbum::view)
        .theme(ClassAlbum::theme)
        .subscription(ClassAlbum::subscription)
        .centered()
        .run_with(ClassAlbum::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::thumbnail::Thumbnail;
    use crate::site::FetchCause;
    use crate::state::data::RawRecord;
    use crate::state::derived::{format_duration, DerivedVideoInfo};
    use crate::state::library::DataSource;
    use std::path::PathBuf;
    use std::time::Instant;

    fn raw(name: &str, date: &str) -> RawRecord {
        RawRecord {
            url: format!("media/{}.bin", name),
            name: name.to_string(),
            date: date.to_string(),
            description: None,
        }
    }

    fn app() -> ClassAlbum {
        ClassAlbum::with_config(AlbumConfig {
            site: "/srv/class".to_string(),
            // Exits at once and ignores its arguments
            player: PathBuf::from("true"),
            ..AlbumConfig::default()
        })
    }

    fn sample_album(generation: u64) -> Album {
        Album::from_sources(
            vec![raw("photo", "2024-03-01")],
            vec![raw("new_clip", "2024-05-01"), raw("old_clip", "2023-01-01")],
            generation,
        )
    }

    /// Ready app with [new_clip (0), photo (1), old_clip (2)]
    fn loaded() -> ClassAlbum {
        let mut app = app();
        let _ = app.reload();
        let generation = app.generation;
        let _ = app.update(Message::Loaded {
            generation,
            result: Ok(sample_album(generation)),
        });
        app
    }

    fn ready() -> Derivation {
        Derivation::Ready(DerivedVideoInfo {
            thumbnail: Thumbnail::Placeholder,
            duration: format_duration(30.0),
        })
    }

    #[test]
    fn test_load_result_shows_album() {
        let app = loaded();
        assert!(matches!(app.phase, Phase::Ready));
        assert_eq!(app.album.len(), 3);
        assert_eq!(app.album.get(0).unwrap().name, "new_clip");
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut app = loaded();
        let old = app.generation;

        let _ = app.reload();
        assert_eq!(app.generation, old + 1);
        assert!(matches!(app.phase, Phase::Loading));

        let _ = app.update(Message::Derived {
            generation: old,
            index: 0,
            derivation: ready(),
        });
        let _ = app.update(Message::ImageChecked {
            generation: old,
            index: 1,
            handle: None,
        });
        let _ = app.update(Message::Loaded {
            generation: old,
            result: Ok(sample_album(old)),
        });
        let _ = app.update(Message::Loaded {
            generation: old,
            result: Err(LoadError {
                collection: DataSource::Videos,
                cause: FetchCause::Json("trailing comma".into()),
            }),
        });

        assert!(app.derived.is_pending(0));
        assert!(!app.images.is_checked(1));
        assert!(matches!(app.phase, Phase::Loading));
        assert!(app.album.is_empty());

        let current = app.generation;
        let _ = app.update(Message::Loaded {
            generation: current,
            result: Ok(sample_album(current)),
        });
        let _ = app.update(Message::Derived {
            generation: current,
            index: 0,
            derivation: ready(),
        });
        assert!(matches!(app.phase, Phase::Ready));
        assert!(!app.derived.is_pending(0));
    }

    #[test]
    fn test_filter_change_only_rederives_loading_tiles() {
        let mut app = loaded();
        assert_eq!(app.pending_work().len(), 3);

        let generation = app.generation;
        let _ = app.update(Message::Derived {
            generation,
            index: 0,
            derivation: ready(),
        });

        let _ = app.update(Message::FilterSelected(Filter::Video));
        assert_eq!(
            app.pending_work(),
            vec![Enhancement::Derive {
                index: 2,
                location: app.site.resolve("media/old_clip.bin"),
            }]
        );

        let _ = app.update(Message::FilterSelected(Filter::Image));
        assert_eq!(
            app.pending_work(),
            vec![Enhancement::Check {
                index: 1,
                location: app.site.resolve("media/photo.bin"),
            }]
        );

        let _ = app.update(Message::ImageChecked {
            generation,
            index: 1,
            handle: None,
        });
        assert!(app.pending_work().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_navigation_stops_playback() {
        let mut app = loaded();

        let _ = app.update(Message::TileClicked(0));
        let _ = app.update(Message::TogglePlayback);
        assert_eq!(app.playback.playing(), Some(0));

        // Already at the first record: nothing changes
        let _ = app.update(Message::Prev);
        assert_eq!(app.lightbox.current(), Some(0));
        assert_eq!(app.playback.playing(), Some(0));

        let _ = app.update(Message::Next);
        assert_eq!(app.lightbox.current(), Some(1));
        assert_eq!(app.playback.playing(), None);

        let _ = app.update(Message::Next);
        let _ = app.update(Message::TogglePlayback);
        assert_eq!(app.playback.playing(), Some(2));

        let _ = app.update(Message::CloseModal);
        assert_eq!(app.lightbox.current(), None);
        assert_eq!(app.playback.playing(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_video_plays_again_with_one_click() {
        let mut app = loaded();
        let _ = app.update(Message::TileClicked(2));
        let _ = app.update(Message::TogglePlayback);
        assert_eq!(app.playback.playing(), Some(2));

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.playback.playing().is_some() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            let _ = app.update(Message::PlaybackTick);
        }
        assert_eq!(app.playback.playing(), None);

        let _ = app.update(Message::TogglePlayback);
        assert_eq!(app.playback.playing(), Some(2));
    }

    #[test]
    fn test_escape_closes_lightbox() {
        let mut app = loaded();
        let _ = app.update(Message::Key(Named::Escape));
        assert_eq!(app.lightbox.current(), None);

        let _ = app.update(Message::TileClicked(1));
        let _ = app.update(Message::Key(Named::ArrowRight));
        assert_eq!(app.lightbox.current(), Some(2));
        let _ = app.update(Message::Key(Named::Escape));
        assert_eq!(app.lightbox.current(), None);
    }
}
