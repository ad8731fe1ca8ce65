/// Media asset handling
///
/// This module handles:
/// - Deriving video previews and durations (probe.rs)
/// - Encoding thumbnails and the placeholder image (thumbnail.rs)
/// - Checking that photos load (check.rs)
/// - Playing videos in an external player (playback.rs)

pub mod check;
pub mod playback;
pub mod probe;
pub mod thumbnail;
