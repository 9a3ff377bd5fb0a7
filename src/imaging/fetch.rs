use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::Bitmap;

/// Failure to retrieve or decode the caller's image.
///
/// Not turned into a JSON error body: it aborts the request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("image at {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("decode task for {url} did not complete: {source}")]
    Task {
        url: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// GET `url` and decode the body into a [`Bitmap`].
pub async fn fetch_image(client: &Client, url: &str) -> Result<Bitmap, FetchError> {
    log::debug!("Fetching image {url}");

    let request_err = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let resp = client.get(url).send().await.map_err(request_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = resp.bytes().await.map_err(request_err)?;
    let len = bytes.len();

    // Image decode is CPU-bound; run off the async pool.
    let bitmap = tokio::task::spawn_blocking(move || decode_bitmap(&bytes))
        .await
        .map_err(|source| FetchError::Task {
            url: url.to_string(),
            source,
        })?
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

    log::debug!(
        "Fetched {len} bytes, decoded {}x{}",
        bitmap.width(),
        bitmap.height()
    );
    Ok(bitmap)
}

/// Decode raw image bytes in any supported format into an RGB bitmap.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.into_rgb8())
}
