use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::imaging::{
    self, BoundingBox, FACE_BOX_COLOR, FACE_BOX_STROKE, draw_bounding_boxes, encode_bitmap,
    run_blocking,
};
use crate::rehost::{ImageHost, ImgurHost, RehostOutcome};
use crate::vision::{
    ErrorBody, Face, ImageClassifier, Property, TextRecognitionResult, TextRecognizer,
};

/// Moderation labels and faces for one image, plus the annotated copy.
///
/// `annotated_image_link` / `annotated_image_error` are only present when
/// faces were found: they report how re-hosting the annotated image went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub properties: Vec<Property>,
    pub faces: Vec<Face>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image_error: Option<ErrorBody>,
}

/// Result of the classification pipeline as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassificationResult {
    Analyzed(ClassificationReport),
    Failed(ErrorBody),
}

/// Both analysis pipelines, wired to one configuration.
///
/// Holds no per-request state; a single instance serves every request.
///
/// # Example
///
/// ```rust,no_run
/// use yc_vision_api::config::Config;
/// use yc_vision_api::pipeline::VisionPipeline;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut config = Config::default();
/// config.apply_env();
///
/// let pipeline = VisionPipeline::new(&config);
/// let result = pipeline.text_recognition("https://example.com/page.png").await?;
/// println!("{}", serde_json::to_string(&result)?);
/// # Ok(())
/// # }
/// ```
pub struct VisionPipeline {
    client: Client,
    recognizer: TextRecognizer,
    classifier: ImageClassifier,
    host: Arc<dyn ImageHost>,
}

impl VisionPipeline {
    pub fn new(config: &Config) -> Self {
        let client = Client::new();
        Self {
            recognizer: TextRecognizer::new(&config.yandex, client.clone()),
            classifier: ImageClassifier::new(&config.yandex, client.clone()),
            host: Arc::new(ImgurHost::new(&config.imgur, client.clone())),
            client,
        }
    }

    /// Replace the image host used for annotated images.
    pub fn with_image_host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.host = host;
        self
    }

    /// Fetch the image, run OCR, return the recognised text.
    ///
    /// `Err` means the image could not be fetched or decoded, or the OCR
    /// response was malformed.
    pub async fn text_recognition(&self, image_url: &str) -> Result<TextRecognitionResult> {
        log::info!("Text recognition for {image_url}");

        let bitmap = imaging::fetch_image(&self.client, image_url).await?;
        let payload = run_blocking(move || encode_bitmap(&bitmap)).await?;
        self.recognizer.recognize(&payload).await
    }

    /// Fetch the image, run moderation and face detection, and if faces were
    /// found, outline them and re-host the annotated image.
    pub async fn classification(&self, image_url: &str) -> Result<ClassificationResult> {
        log::info!("Classification for {image_url}");

        let bitmap = imaging::fetch_image(&self.client, image_url).await?;
        let (mut bitmap, payload) = run_blocking(move || {
            let payload = encode_bitmap(&bitmap)?;
            Ok((bitmap, payload))
        })
        .await?;

        let analysis = match self.classifier.analyze(&payload).await? {
            Ok(analysis) => analysis,
            Err(error) => return Ok(ClassificationResult::Failed(error)),
        };

        let mut report = ClassificationReport {
            properties: analysis.properties,
            faces: analysis.faces,
            annotated_image_link: None,
            annotated_image_error: None,
        };

        if report.faces.is_empty() {
            log::debug!("No faces detected, skipping annotation");
            return Ok(ClassificationResult::Analyzed(report));
        }

        let boxes = report
            .faces
            .iter()
            .map(Face::bounding_box)
            .collect::<Result<Vec<BoundingBox>>>()
            .context("Malformed face bounding box")?;
        log::info!("Outlining {} face(s)", boxes.len());
        let bitmap = run_blocking(move || {
            draw_bounding_boxes(&mut bitmap, &boxes, FACE_BOX_COLOR, FACE_BOX_STROKE);
            Ok(bitmap)
        })
        .await?;

        match self.host.upload(bitmap).await? {
            RehostOutcome::Hosted { link } => report.annotated_image_link = Some(link),
            RehostOutcome::Failed(error) => {
                log::warn!("{} upload failed", self.host.name());
                report.annotated_image_error = Some(error);
            }
        }

        Ok(ClassificationResult::Analyzed(report))
    }
}
