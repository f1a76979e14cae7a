use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use image::DynamicImage;

use crate::models::verification::ImageRole;

/// Decode a submitted image string into an in-memory raster image.
///
/// Accepts a data URI or bare base64. Whitespace is ignored and missing `=`
/// padding is restored before decoding. The URL-safe alphabet is tried when
/// the standard one fails.
pub fn decode_image(role: ImageRole, encoded: &str) -> Result<DynamicImage, DecodeError> {
    let bytes = decode_payload(role, encoded)?;
    image::load_from_memory(&bytes).map_err(|source| DecodeError::Image { role, source })
}

/// Decode the base64 payload of a submitted image without interpreting it.
pub fn decode_payload(role: ImageRole, encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = strip_data_uri(encoded);

    let mut normalized: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if normalized.is_empty() {
        return Err(DecodeError::Empty { role });
    }

    let missing = (4 - normalized.len() % 4) % 4;
    normalized.extend(std::iter::repeat('=').take(missing));

    STANDARD
        .decode(&normalized)
        .or_else(|err| URL_SAFE.decode(&normalized).map_err(|_| err))
        .map_err(|source| DecodeError::Base64 { role, source })
}

/// Everything up to and including the first comma is treated as a data-URI header.
fn strip_data_uri(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{role} contains no image data")]
    Empty { role: ImageRole },

    #[error("{role} is not valid base64: {source}")]
    Base64 {
        role: ImageRole,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{role} is not a supported image: {source}")]
    Image {
        role: ImageRole,
        #[source]
        source: image::ImageError,
    },
}

impl DecodeError {
    pub fn role(&self) -> ImageRole {
        match self {
            DecodeError::Empty { role }
            | DecodeError::Base64 { role, .. }
            | DecodeError::Image { role, .. } => *role,
        }
    }
}
