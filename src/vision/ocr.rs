use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ErrorBody, UpstreamOutcome};
use crate::config::YandexConfig;
use crate::imaging::EncodedPayload;

/// Result of the text recognition pipeline as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextRecognitionResult {
    Recognized { text: String },
    Failed(ErrorBody),
}

#[derive(Deserialize)]
struct RecognizeTextResponse {
    result: RecognizeTextResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeTextResult {
    text_annotation: TextAnnotation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    full_text: String,
}

/// Client for the Yandex Cloud OCR `recognizeText` endpoint.
pub struct TextRecognizer {
    url: String,
    iam_token: String,
    folder_id: String,
    data_logging: bool,
    client: Client,
}

impl TextRecognizer {
    pub fn new(config: &YandexConfig, client: Client) -> Self {
        Self {
            url: config.ocr_url.clone(),
            iam_token: config.iam_token.clone(),
            folder_id: config.folder_id.clone(),
            data_logging: config.data_logging,
            client,
        }
    }

    /// Send the image to OCR and extract the page's full text.
    ///
    /// Upstream failures come back as [`TextRecognitionResult::Failed`];
    /// `Err` means a 200 response without `result.textAnnotation.fullText`.
    pub async fn recognize(&self, payload: &EncodedPayload) -> Result<TextRecognitionResult> {
        let body = json!({
            "mimeType": "JPEG",
            "languageCodes": ["*"],
            "model": "page",
            "content": payload,
        });

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.iam_token)
            .header("x-folder-id", &self.folder_id)
            .header("x-data-logging-enabled", self.data_logging.to_string())
            .json(&body);

        match UpstreamOutcome::send(request).await {
            UpstreamOutcome::Success { body } => {
                let parsed: RecognizeTextResponse =
                    serde_json::from_str(&body).context("Unexpected OCR response shape")?;
                Ok(TextRecognitionResult::Recognized {
                    text: parsed.result.text_annotation.full_text,
                })
            }
            UpstreamOutcome::HttpStatus { body, .. } => {
                Ok(TextRecognitionResult::Failed(ErrorBody::upstream(&body)))
            }
            UpstreamOutcome::TransportFailure { code, message } => Ok(
                TextRecognitionResult::Failed(ErrorBody::not_response(code, Some(message))),
            ),
        }
    }
}
