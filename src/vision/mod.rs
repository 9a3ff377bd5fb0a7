//! Yandex Cloud Vision clients and the outcome types shared by every
//! upstream call (OCR, batch analysis, image hosting).

mod classify;
mod ocr;

pub use classify::{
    BatchAnalysis, Face, FacePolygon, ImageClassifier, Property, Vertex,
};
pub use ocr::{TextRecognitionResult, TextRecognizer};

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;

/// Value of `error` when an upstream call produced no response at all.
pub const NOT_RESPONSE: &str = "not response";

/// What came back from one outbound HTTP call.
///
/// Only `200 OK` counts as success; every other status is surfaced with its
/// raw body and no per-status handling.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    Success { body: String },
    HttpStatus { code: StatusCode, body: String },
    TransportFailure { code: Option<StatusCode>, message: String },
}

impl UpstreamOutcome {
    /// Send the request and classify the result. Never fails.
    pub async fn send(request: RequestBuilder) -> Self {
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Upstream request failed: {e}");
                return Self::TransportFailure {
                    code: e.status(),
                    message: e.to_string(),
                };
            }
        };

        let status = resp.status();
        log::debug!("Upstream {} answered {status}", resp.url());

        match resp.text().await {
            Ok(body) if status == StatusCode::OK => Self::Success { body },
            Ok(body) => {
                log::warn!("Upstream error ({status}): {body}");
                Self::HttpStatus { code: status, body }
            }
            Err(e) => {
                log::warn!("Failed to read upstream response body: {e}");
                Self::TransportFailure {
                    code: Some(status),
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Caller-visible error payload for an upstream failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// `{"error": "not response", "code": ..., "msg": ...}`
    NotResponse {
        error: &'static str,
        code: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        msg: Option<String>,
    },
    /// `{"error": <upstream body>}`
    Upstream { error: serde_json::Value },
}

impl ErrorBody {
    pub fn not_response(code: Option<StatusCode>, msg: Option<String>) -> Self {
        Self::NotResponse {
            error: NOT_RESPONSE,
            code: code.map(|c| c.as_u16()),
            msg,
        }
    }

    /// Wrap an upstream body, keeping it as JSON when it parses.
    pub fn upstream(body: &str) -> Self {
        let error = serde_json::from_str(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
        Self::Upstream { error }
    }
}
