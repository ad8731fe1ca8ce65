//! Site source
//!
//! The album reads everything relative to a site base: either the local
//! folder the class website lives in, or the URL it is served from.
//! Data files live under `<base>/data/`, media URLs in the data files are
//! relative to the base unless they are absolute http(s) URLs.

use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "http")]
pub mod http;

/// Where the class website lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Site {
    Directory(PathBuf),
    Remote(String),
}

/// A resolved data file or media asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Local(PathBuf),
    Remote(String),
}

/// Why a data file or asset could not be fetched
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchCause {
    #[error("could not read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("this build cannot fetch {0}: http support is disabled")]
    Unsupported(String),
}

/// Check if a path looks like an HTTP URL.
pub fn is_http_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

impl Site {
    pub fn parse(base: &str) -> Self {
        let base = base.trim();
        if is_http_url(base) {
            Site::Remote(base.trim_end_matches('/').to_string())
        } else {
            Site::Directory(PathBuf::from(base))
        }
    }

    /// Location of a file in the site's `data/` folder
    pub fn data_file(&self, file_name: &str) -> AssetLocation {
        self.resolve(&format!("data/{}", file_name))
    }

    /// Resolve a URL from a data file against the site base
    pub fn resolve(&self, url: &str) -> AssetLocation {
        if is_http_url(url) {
            return AssetLocation::Remote(url.to_string());
        }

        let relative = url.trim_start_matches("./").trim_start_matches('/');
        match self {
            Site::Directory(root) => AssetLocation::Local(root.join(relative)),
            Site::Remote(base) => AssetLocation::Remote(format!("{}/{}", base, relative)),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Directory(root) => write!(f, "{}", root.display()),
            Site::Remote(base) => f.write_str(base),
        }
    }
}

impl AssetLocation {
    /// Input argument for ffprobe/ffmpeg/ffplay, which accept both paths and URLs
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            AssetLocation::Local(path) => path.as_os_str(),
            AssetLocation::Remote(url) => OsStr::new(url),
        }
    }

    /// Read the whole asset
    pub async fn read(&self) -> Result<Vec<u8>, FetchCause> {
        match self {
            AssetLocation::Local(path) => {
                tokio::fs::read(path).await.map_err(|e| FetchCause::Read {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
            AssetLocation::Remote(url) => read_remote(url.clone()).await,
        }
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocation::Local(path) => write!(f, "{}", path.display()),
            AssetLocation::Remote(url) => f.write_str(url),
        }
    }
}

#[cfg(feature = "http")]
async fn read_remote(url: String) -> Result<Vec<u8>, FetchCause> {
    let request_url = url.clone();
    tokio::task::spawn_blocking(move || http::get_bytes(&request_url))
        .await
        .map_err(|e| FetchCause::Transport {
            url,
            message: format!("task join error: {}", e),
        })?
}

#[cfg(not(feature = "http"))]
async fn read_remote(url: String) -> Result<Vec<u8>, FetchCause> {
    Err(FetchCause::Unsupported(url))
}
