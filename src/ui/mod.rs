/// UI module
///
/// Widgets for the album window:
/// - The filtered media grid (grid.rs)
/// - The lightbox overlay (modal.rs)
/// - Loading and error panels (this file)
pub mod grid;
pub mod modal;

use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length};

use crate::site::{FetchCause, Site};
use crate::state::library::LoadError;
use crate::Message;

/// Shown while the data files are being fetched
pub fn loading_panel<'a>(site: &Site) -> Element<'a, Message> {
    container(
        column![
            text("Loading album…").size(24),
            text(format!("Reading {}", site)).size(14),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

/// Replaces the grid when either data file failed to load
pub fn error_panel<'a>(error: &LoadError, site: &Site) -> Element<'a, Message> {
    let causes = likely_causes(error)
        .into_iter()
        .fold(Column::new().spacing(4), |list, cause| {
            list.push(text(format!("• {}", cause)).size(14))
        });

    let content = column![
        text("Could not load the album").size(28),
        text(format!(
            "Failed to load {} ({})",
            error.collection,
            error.collection.file_name()
        ))
        .size(16),
        text(error.cause.to_string()).size(14),
        text(format!("Site: {}", site)).size(14),
        text("Likely causes:").size(16),
        causes,
        row_of_actions(),
    ]
    .spacing(12)
    .max_width(640);

    container(content)
        .padding(40)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn row_of_actions<'a>() -> Element<'a, Message> {
    row![
        button("Retry").on_press(Message::Reload).padding(10),
        button("Open site…")
            .on_press(Message::OpenSite)
            .padding(10)
            .style(button::secondary),
    ]
    .spacing(12)
    .into()
}

/// Human hints for a load failure, most specific first
pub fn likely_causes(error: &LoadError) -> Vec<String> {
    let mut causes = vec![format!(
        "data/{} is missing from the site",
        error.collection.file_name()
    )];

    match &error.cause {
        FetchCause::Json(_) => {
            causes.insert(0, format!("data/{} is not valid JSON", error.collection.file_name()));
        }
        FetchCause::Transport { .. } => {
            causes.insert(0, "The server is not reachable".to_string());
        }
        FetchCause::Unsupported(_) => {
            causes.insert(0, "This build was compiled without http support".to_string());
        }
        _ => {}
    }

    causes.push("The media folders are missing next to data/".to_string());
    causes.push("The site base points at the wrong folder or URL".to_string());
    causes
}
