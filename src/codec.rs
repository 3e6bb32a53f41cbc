//! Wire Codec - Base64 Text to PixelBuffer and Back
//!
//! The wire form is base64 text, optionally prefixed with the browser
//! header `data:image/<format>;base64,`. Decoding auto-detects the
//! container from content; encoding always re-attaches the header.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Default container for encoded output.
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Png;
/// Default encoding quality (only meaningful for lossy containers).
pub const DEFAULT_QUALITY: u8 = 100;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unsupported or corrupt image payload: {0}")]
    Image(#[from] image::ImageError),
}

/// Container formats the encode path can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Lowercased subtype used in the `data:image/...` header.
    pub fn mime_subtype(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(format!("unknown output format `{other}`")),
        }
    }
}

/// Strip the `data:image/<format>;base64,` header if one is present.
/// Anything else is treated as a bare payload.
fn strip_type_header(wire: &str) -> &str {
    if let Some(rest) = wire.strip_prefix("data:image/") {
        if let Some((_, payload)) = rest.split_once(";base64,") {
            return payload;
        }
    }
    wire
}

/// Decode a wire string into a pixel buffer.
///
/// Fails if the payload is not valid base64 or the decoded bytes do
/// not parse as a supported image container.
pub fn decode(wire: &str) -> Result<PixelBuffer, CodecError> {
    let payload = strip_type_header(wire.trim());
    let bytes = STANDARD.decode(payload)?;
    let image = image::load_from_memory(&bytes)?;
    log::debug!(
        "decoded {} byte payload into {}x{} image",
        bytes.len(),
        image.width(),
        image.height()
    );
    Ok(PixelBuffer::from_dynamic(image))
}

/// Encode a pixel buffer into a header-prefixed wire string.
///
/// Output is always 3-channel color, even when the buffer is
/// single-channel; this expansion is externally observable on the
/// wire and is kept intentionally. Quality outside 1..=100 is clamped
/// and only affects lossy containers.
pub fn encode(buffer: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<String, CodecError> {
    let rgb = buffer.to_rgb();
    let mut bytes = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgb8(rgb).write_to(&mut bytes, ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)?;
        }
    }
    Ok(format!(
        "data:image/{};base64,{}",
        format.mime_subtype(),
        STANDARD.encode(bytes.get_ref())
    ))
}
