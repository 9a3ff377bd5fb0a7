use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

use crate::config::ImgurConfig;
use crate::imaging::{Bitmap, encode_bitmap, run_blocking};
use crate::vision::{ErrorBody, UpstreamOutcome};

/// Outcome of uploading an annotated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RehostOutcome {
    Hosted { link: String },
    Failed(ErrorBody),
}

/// Trait for public image hosts.
///
/// The library ships with [`ImgurHost`]; other hosts (or test doubles) can
/// be plugged into the pipeline with
/// [`VisionPipeline::with_image_host`](crate::pipeline::VisionPipeline::with_image_host).
#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    /// The display name of this host (e.g., "Imgur").
    fn name(&self) -> &str;
    /// Upload the bitmap and return its public link. Takes ownership so the
    /// encode can move to the blocking pool.
    ///
    /// Upstream failures are reported as [`RehostOutcome::Failed`]; `Err` is
    /// reserved for encoding failures and malformed success responses.
    async fn upload(&self, bitmap: Bitmap) -> Result<RehostOutcome>;
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    link: String,
}

/// Anonymous Imgur uploads authenticated with a client id.
pub struct ImgurHost {
    client_id: String,
    upload_url: String,
    description: String,
    client: Client,
}

impl ImgurHost {
    pub fn new(config: &ImgurConfig, client: Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            upload_url: config.upload_url.clone(),
            description: config.description.clone(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl ImageHost for ImgurHost {
    fn name(&self) -> &str {
        "Imgur"
    }

    async fn upload(&self, bitmap: Bitmap) -> Result<RehostOutcome> {
        let payload = run_blocking(move || encode_bitmap(&bitmap)).await?;
        let form = Form::new()
            .text("image", payload.into_string())
            .text("description", self.description.clone());

        let request = self
            .client
            .post(&self.upload_url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form);

        match UpstreamOutcome::send(request).await {
            UpstreamOutcome::Success { body } => {
                let parsed: UploadResponse =
                    serde_json::from_str(&body).context("Unexpected Imgur response shape")?;
                log::info!("Annotated image hosted at {}", parsed.data.link);
                Ok(RehostOutcome::Hosted {
                    link: parsed.data.link,
                })
            }
            UpstreamOutcome::HttpStatus { body, .. } => {
                Ok(RehostOutcome::Failed(ErrorBody::upstream(&body)))
            }
            UpstreamOutcome::TransportFailure { code, .. } => {
                Ok(RehostOutcome::Failed(ErrorBody::not_response(code, None)))
            }
        }
    }
}
