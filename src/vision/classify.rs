use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use super::{ErrorBody, UpstreamOutcome};
use crate::config::YandexConfig;
use crate::imaging::{BoundingBox, EncodedPayload};

/// One moderation label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub probability: f64,
}

/// Polygon corner. The API sends coordinates as decimal strings and omits
/// zero values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default, deserialize_with = "coordinate")]
    pub x: i32,
    #[serde(default, deserialize_with = "coordinate")]
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacePolygon {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// A detected face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    pub bounding_box: FacePolygon,
}

impl Face {
    /// Rectangle spanned by the first and third polygon vertices.
    ///
    /// Vertex 0 is taken as top-left and vertex 2 as bottom-right; corners
    /// are normalised so a reversed polygon still gives a valid box.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let vertices = &self.bounding_box.vertices;
        let (first, third) = match (vertices.first(), vertices.get(2)) {
            (Some(a), Some(c)) => (a, c),
            _ => anyhow::bail!(
                "Face polygon has {} vertices, expected 4",
                vertices.len()
            ),
        };
        Ok(BoundingBox::from_corners(
            (first.x, first.y),
            (third.x, third.y),
        ))
    }
}

/// Moderation properties and faces extracted from a batch analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAnalysis {
    pub properties: Vec<Property>,
    pub faces: Vec<Face>,
}

#[derive(Deserialize)]
struct BatchAnalyzeResponse {
    #[serde(default)]
    results: Vec<AnalyzeResult>,
}

#[derive(Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    results: Vec<FeatureResult>,
}

/// Each feature result carries exactly one key naming the feature.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureResult {
    classification: Option<ClassificationFeature>,
    face_detection: Option<FaceDetectionFeature>,
}

#[derive(Deserialize)]
struct ClassificationFeature {
    #[serde(default)]
    properties: Vec<Property>,
}

#[derive(Deserialize)]
struct FaceDetectionFeature {
    #[serde(default)]
    faces: Vec<Face>,
}

impl BatchAnalysis {
    /// Pick the classification and face detection results out of a
    /// `batchAnalyze` body by feature key, whatever their order.
    fn from_body(body: &str) -> Result<Self> {
        let response: BatchAnalyzeResponse =
            serde_json::from_str(body).context("Unexpected batchAnalyze response shape")?;
        let spec = response
            .results
            .into_iter()
            .next()
            .context("batchAnalyze response has no results")?;

        let mut properties = None;
        let mut faces = Vec::new();
        for feature in spec.results {
            if let Some(classification) = feature.classification {
                if properties.is_none() {
                    properties = Some(classification.properties);
                }
            }
            if let Some(detection) = feature.face_detection {
                faces.extend(detection.faces);
            }
        }

        Ok(Self {
            properties: properties.context("batchAnalyze response has no classification result")?,
            faces,
        })
    }
}

/// Client for the Yandex Cloud Vision `batchAnalyze` endpoint, requesting
/// moderation classification and face detection in one call.
pub struct ImageClassifier {
    url: String,
    iam_token: String,
    folder_id: String,
    client: Client,
}

impl ImageClassifier {
    pub fn new(config: &YandexConfig, client: Client) -> Self {
        Self {
            url: config.vision_url.clone(),
            iam_token: config.iam_token.clone(),
            folder_id: config.folder_id.clone(),
            client,
        }
    }

    /// Run moderation and face detection on the image.
    ///
    /// Upstream failures come back as `Ok(Err(ErrorBody))`; the outer `Err`
    /// is reserved for a 200 response that cannot be interpreted.
    pub async fn analyze(
        &self,
        payload: &EncodedPayload,
    ) -> Result<std::result::Result<BatchAnalysis, ErrorBody>> {
        let body = json!({
            "folderId": self.folder_id,
            "analyze_specs": [{
                "content": payload,
                "features": [
                    {
                        "type": "CLASSIFICATION",
                        "classificationConfig": { "model": "moderation" }
                    },
                    { "type": "FACE_DETECTION" }
                ]
            }]
        });

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.iam_token)
            .json(&body);

        match UpstreamOutcome::send(request).await {
            UpstreamOutcome::Success { body } => BatchAnalysis::from_body(&body).map(Ok),
            UpstreamOutcome::HttpStatus { body, .. } => Ok(Err(ErrorBody::upstream(&body))),
            UpstreamOutcome::TransportFailure { code, message } => {
                Ok(Err(ErrorBody::not_response(code, Some(message))))
            }
        }
    }
}

/// Accept a coordinate as a JSON number or a decimal string.
fn coordinate<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(v) => v,
        Raw::Float(v) => v as i64,
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid coordinate {s:?}: {e}")))?,
    };
    i32::try_from(value).map_err(|_| D::Error::custom(format!("coordinate {value} out of range")))
}
