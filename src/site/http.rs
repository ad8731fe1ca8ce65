//! Blocking HTTP reads for remote sites.
//!
//! Called from tokio's blocking pool by [`super::AssetLocation::read`].

use super::FetchCause;

/// Upper bound for a single response body (photos can be large)
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// GET a URL and return the body. Non-2xx answers become `FetchCause::Status`.
pub fn get_bytes(url: &str) -> Result<Vec<u8>, FetchCause> {
    let mut response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::StatusCode(status) => FetchCause::Status {
            url: url.to_string(),
            status,
        },
        other => FetchCause::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    })?;

    response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
        .map_err(|e| FetchCause::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
}
