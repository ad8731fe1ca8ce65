use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use iced::widget::image::Handle;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageResult};
use std::fmt;
use std::sync::OnceLock;

/// Size of the generic placeholder raster
const PLACEHOLDER_WIDTH: u32 = 200;
const PLACEHOLDER_HEIGHT: u32 = 150;

/// Placeholder fill (#dddddd)
const PLACEHOLDER_GRAY: u8 = 0xdd;

/// A still preview for a tile or the viewer
#[derive(Clone)]
pub enum Thumbnail {
    /// A frame captured from the asset, JPEG encoded
    Frame {
        jpeg: Vec<u8>,
        width: u32,
        height: u32,
        handle: Handle,
    },
    /// Generic stand-in for assets that could not be loaded
    Placeholder,
}

impl Thumbnail {
    /// Image handle for the iced image widget
    pub fn handle(&self) -> Handle {
        match self {
            Thumbnail::Frame { handle, .. } => handle.clone(),
            Thumbnail::Placeholder => placeholder_handle(),
        }
    }

    /// Inline `data:` URI for a captured frame. None for the placeholder.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Thumbnail::Frame { jpeg, .. } => {
                Some(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
            }
            Thumbnail::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Thumbnail::Placeholder)
    }
}

// The JPEG bytes are too noisy for debug output
impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thumbnail::Frame {
                jpeg,
                width,
                height,
                ..
            } => f
                .debug_struct("Frame")
                .field("width", width)
                .field("height", height)
                .field("bytes", &jpeg.len())
                .finish(),
            Thumbnail::Placeholder => f.write_str("Placeholder"),
        }
    }
}

/// Encode a captured frame as a JPEG still at its own pixel size.
pub fn encode_frame(frame: &DynamicImage, quality: u8) -> ImageResult<Thumbnail> {
    // JPEG has no alpha channel
    let rgb = frame.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(&rgb)?;

    Ok(Thumbnail::Frame {
        width: rgb.width(),
        height: rgb.height(),
        handle: Handle::from_bytes(jpeg.clone()),
        jpeg,
    })
}

/// Shared handle for the gray placeholder raster
pub fn placeholder_handle() -> Handle {
    static PLACEHOLDER: OnceLock<Handle> = OnceLock::new();

    PLACEHOLDER
        .get_or_init(|| {
            let pixels = [PLACEHOLDER_GRAY, PLACEHOLDER_GRAY, PLACEHOLDER_GRAY, 0xff]
                .repeat((PLACEHOLDER_WIDTH * PLACEHOLDER_HEIGHT) as usize);
            Handle::from_rgba(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, pixels)
        })
        .clone()
}
