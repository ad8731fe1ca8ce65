//! Application configuration.
//!
//! Read from `<config dir>/class-album/config.json` when present; every field
//! has a default. The site base can be overridden by the `CLASS_ALBUM_SITE`
//! environment variable and, above that, by the first command line argument.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::media::probe::DeriveSettings;
use crate::state::data::Filter;

/// Environment variable naming the site base
pub const SITE_ENV: &str = "CLASS_ALBUM_SITE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumConfig {
    /// Site folder or http(s) URL
    pub site: String,
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    /// External player used for video playback
    pub player: PathBuf,
    pub seek_offset_secs: f64,
    pub jpeg_quality: u8,
    /// Filter selected at startup
    pub filter: Filter,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        let derive = DeriveSettings::default();
        AlbumConfig {
            site: ".".to_string(),
            ffprobe: derive.ffprobe,
            ffmpeg: derive.ffmpeg,
            player: PathBuf::from("ffplay"),
            seek_offset_secs: derive.seek_offset_secs,
            jpeg_quality: derive.jpeg_quality,
            filter: Filter::All,
        }
    }
}

impl AlbumConfig {
    /// Get the path where the config file is expected
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("class-album").join("config.json"))
    }

    /// Read a config file. `Ok(None)` if it does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    /// Config file (or defaults) with environment and command line overrides applied.
    /// A broken config file is logged and ignored.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => match Self::from_file(&path) {
                Ok(Some(config)) => {
                    log::info!("📁 Config loaded from {}", path.display());
                    config
                }
                Ok(None) => AlbumConfig::default(),
                Err(err) => {
                    log::warn!("⚠️  {}; using defaults", err);
                    AlbumConfig::default()
                }
            },
            None => AlbumConfig::default(),
        };

        config.apply_overrides(std::env::var(SITE_ENV).ok(), std::env::args().nth(1));
        config
    }

    /// Command line beats environment beats config file
    pub fn apply_overrides(&mut self, env_site: Option<String>, arg_site: Option<String>) {
        let site = arg_site
            .into_iter()
            .chain(env_site)
            .find(|site| !site.trim().is_empty());

        if let Some(site) = site {
            self.site = site;
        }
    }

    pub fn derive_settings(&self) -> DeriveSettings {
        DeriveSettings {
            ffprobe: self.ffprobe.clone(),
            ffmpeg: self.ffmpeg.clone(),
            seek_offset_secs: self.seek_offset_secs,
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AlbumConfig::from_file(&dir.path().join("config.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"site": "/srv/class", "filter": "video"}"#).unwrap();

        let config = AlbumConfig::from_file(&path).unwrap().unwrap();

        assert_eq!(config.site, "/srv/class");
        assert_eq!(config.filter, Filter::Video);
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.seek_offset_secs, 0.1);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ site: nope").unwrap();

        let err = AlbumConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_override_precedence() {
        let mut config = AlbumConfig::default();
        config.apply_overrides(Some("/from/env".into()), Some("/from/arg".into()));
        assert_eq!(config.site, "/from/arg");

        let mut config = AlbumConfig::default();
        config.apply_overrides(Some("/from/env".into()), None);
        assert_eq!(config.site, "/from/env");

        let mut config = AlbumConfig::default();
        config.apply_overrides(Some("  ".into()), None);
        assert_eq!(config.site, ".");
    }

    #[test]
    fn test_derive_settings_clamp_quality() {
        let config = AlbumConfig {
            jpeg_quality: 0,
            ..AlbumConfig::default()
        };
        assert_eq!(config.derive_settings().jpeg_quality, 1);
    }
}
