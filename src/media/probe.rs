/// Video preview and duration derivation
///
/// For each video the album asks ffprobe for the stream metadata, then has
/// ffmpeg seek a little past the start and hand back one frame as PNG.
/// The frame is re-encoded as a JPEG thumbnail.
use image::ImageFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use super::thumbnail::{encode_frame, Thumbnail};
use crate::site::AssetLocation;
use crate::state::derived::{format_duration, Derivation, DerivedVideoInfo};

/// Tools and tuning for derivation, taken from the config
#[derive(Debug, Clone)]
pub struct DeriveSettings {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    /// Where to grab the frame; the very first frame is often black
    pub seek_offset_secs: f64,
    pub jpeg_quality: u8,
}

impl Default for DeriveSettings {
    fn default() -> Self {
        DeriveSettings {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
            seek_offset_secs: 0.1,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Tool {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("unreadable ffprobe output: {0}")]
    Probe(#[from] serde_json::Error),
    #[error("no video stream")]
    NoVideoStream,
    #[error("could not decode captured frame: {0}")]
    Frame(#[from] image::ImageError),
}

/// What ffprobe reports about a video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    /// NaN when the container does not know its length
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe prints numbers as strings, or "N/A"
    duration: Option<String>,
}

/// Derive the thumbnail and duration for one video.
///
/// Never fails: an asset that cannot be probed yields the placeholder with an
/// unknown duration, and a failed frame grab keeps the probed duration.
pub async fn derive(settings: DeriveSettings, location: AssetLocation) -> Derivation {
    let metadata = match probe(&settings, &location).await {
        Ok(metadata) => metadata,
        Err(err) => {
            log::warn!("⚠️  Video unavailable {}: {}", location, err);
            return Derivation::Failed(DerivedVideoInfo::unavailable());
        }
    };

    let duration = format_duration(metadata.duration_secs);

    match capture_thumbnail(&settings, &location, &metadata).await {
        Ok(thumbnail) => {
            log::debug!("📸 Preview for {} ({})", location, duration);
            Derivation::Ready(DerivedVideoInfo {
                thumbnail,
                duration,
            })
        }
        Err(err) => {
            log::warn!("⚠️  No preview frame for {}: {}", location, err);
            Derivation::Failed(DerivedVideoInfo {
                thumbnail: Thumbnail::Placeholder,
                duration,
            })
        }
    }
}

/// Read duration and frame size without decoding the video
pub async fn probe(
    settings: &DeriveSettings,
    location: &AssetLocation,
) -> Result<VideoMetadata, DeriveError> {
    let mut command = Command::new(&settings.ffprobe);
    command
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height:format=duration"])
        .args(["-of", "json"])
        .arg(location.as_os_str());

    let stdout = run(command, &settings.ffprobe).await?;
    parse_probe(&stdout)
}

/// Interpret ffprobe's JSON output
pub fn parse_probe(output: &[u8]) -> Result<VideoMetadata, DeriveError> {
    let parsed: ProbeOutput = serde_json::from_slice(output)?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or(DeriveError::NoVideoStream)?;

    let duration_secs = parsed
        .format
        .and_then(|format| format.duration)
        .and_then(|duration| duration.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN);

    Ok(VideoMetadata {
        duration_secs,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

async fn capture_thumbnail(
    settings: &DeriveSettings,
    location: &AssetLocation,
    metadata: &VideoMetadata,
) -> Result<Thumbnail, DeriveError> {
    let offset = seek_offset(settings.seek_offset_secs, metadata.duration_secs);

    let mut command = Command::new(&settings.ffmpeg);
    command
        .args(["-v", "error"])
        .arg("-ss")
        .arg(format!("{:.3}", offset))
        .arg("-i")
        .arg(location.as_os_str())
        .args(["-frames:v", "1"])
        .args(["-c:v", "png"])
        .args(["-f", "image2pipe"])
        .arg("-");

    let png = run(command, &settings.ffmpeg).await?;

    // No scaling: the frame comes out at the video's own pixel size
    let frame = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
    if (frame.width(), frame.height()) != (metadata.width, metadata.height) {
        log::debug!(
            "Frame is {}x{}, stream reports {}x{} (rotated?)",
            frame.width(),
            frame.height(),
            metadata.width,
            metadata.height
        );
    }

    Ok(encode_frame(&frame, settings.jpeg_quality)?)
}

/// Seek target, falling back to the start for clips shorter than the offset
fn seek_offset(preferred: f64, duration_secs: f64) -> f64 {
    if duration_secs.is_finite() && duration_secs <= preferred {
        0.0
    } else {
        preferred.max(0.0)
    }
}

/// Run a tool to completion and return its stdout
async fn run(mut command: Command, tool: &std::path::Path) -> Result<Vec<u8>, DeriveError> {
    let tool = tool.display().to_string();

    let output = command
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| DeriveError::Spawn {
            tool: tool.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(DeriveError::Tool {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}
