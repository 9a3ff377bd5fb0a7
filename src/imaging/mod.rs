//! Image primitives shared by both pipelines: fetching a remote image,
//! encoding it for JSON transport, and drawing face boxes on it.

mod annotate;
mod fetch;

pub use annotate::{BoundingBox, FACE_BOX_COLOR, FACE_BOX_STROKE, draw_bounding_boxes};
pub use fetch::{FetchError, decode_bitmap, fetch_image};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;

/// Decoded in-memory pixel image.
///
/// Everything is normalised to 8-bit RGB on decode: JPEG has no alpha
/// channel, and the annotator draws in RGB.
pub type Bitmap = RgbImage;

/// Base64 text of a JPEG encoding of a [`Bitmap`].
///
/// Serializes as a plain JSON string so it can be embedded directly in
/// upstream request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Encode a bitmap as JPEG (library default quality) and wrap it in base64.
///
/// Deterministic: the same bitmap always yields the same payload.
pub fn encode_bitmap(bitmap: &Bitmap) -> Result<EncodedPayload> {
    let mut jpeg = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .context("Failed to encode image as JPEG")?;
    log::debug!(
        "Encoded {}x{} bitmap to {} JPEG bytes",
        bitmap.width(),
        bitmap.height(),
        jpeg.len()
    );
    Ok(EncodedPayload(STANDARD.encode(&jpeg)))
}

/// Run CPU-bound image work (encode, draw) on the blocking pool so the
/// request's async worker stays free for other tasks.
pub async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("Image task did not complete")?
}
