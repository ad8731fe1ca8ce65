//! Image asset checks.
//!
//! Photos are decoded in full on the blocking pool; a file that only has a
//! valid header fails here and gets the placeholder. Local photos are then
//! shown straight from disk, remote photos from the downloaded bytes.

use iced::widget::image::Handle;

use crate::site::{AssetLocation, FetchCause};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(transparent)]
    Fetch(#[from] FetchCause),
    #[error("not a readable image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("task join error: {0}")]
    Join(String),
}

/// Check that a photo loads and return the handle to display it with
pub async fn load_image(location: AssetLocation) -> Result<Handle, AssetError> {
    match location {
        AssetLocation::Local(path) => {
            let decode_path = path.clone();
            tokio::task::spawn_blocking(move || image::open(&decode_path).map(drop))
                .await
                .map_err(|e| AssetError::Join(e.to_string()))??;
            Ok(Handle::from_path(path))
        }
        remote @ AssetLocation::Remote(_) => {
            let bytes = remote.read().await?;
            let bytes = tokio::task::spawn_blocking(move || {
                image::load_from_memory(&bytes).map(|_| bytes)
            })
            .await
            .map_err(|e| AssetError::Join(e.to_string()))??;
            Ok(Handle::from_bytes(bytes))
        }
    }
}

/// Like [`load_image`], logging failures. `None` means show the placeholder.
pub async fn check_image(location: AssetLocation) -> Option<Handle> {
    let label = location.to_string();
    match load_image(location).await {
        Ok(handle) => Some(handle),
        Err(err) => {
            log::warn!("⚠️  Image unavailable {}: {}", label, err);
            None
        }
    }
}
