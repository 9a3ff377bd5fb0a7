//! # yc-vision-api
//!
//! HTTP gateway for Yandex Cloud Vision. Two read-only routes take an image
//! URL, send the image to the cloud API, and return a JSON summary:
//!
//! | Route | Upstream | Result |
//! |-------|----------|--------|
//! | `GET /text_recognition?url_image=<url>` | OCR `recognizeText` | `{"text": ...}` |
//! | `GET /classification?url_image=<url>` | Vision `batchAnalyze` | moderation properties, faces, annotated image link |
//!
//! When faces are detected, each one is outlined in red on the original
//! image and the annotated copy is uploaded to Imgur.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yc_vision_api::config::Config;
//! use yc_vision_api::server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load(Some("config.json".as_ref()))?;
//!     // iam_token, catalog_id, imgur_client_id
//!     config.apply_env();
//!     server::serve(&config).await
//! }
//! ```
//!
//! ## Library Usage
//!
//! The pipelines can be driven without the HTTP layer:
//!
//! ```rust,no_run
//! use yc_vision_api::config::Config;
//! use yc_vision_api::pipeline::{ClassificationResult, VisionPipeline};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.apply_env();
//! let pipeline = VisionPipeline::new(&config);
//!
//! if let ClassificationResult::Analyzed(report) =
//!     pipeline.classification("https://example.com/team.jpg").await?
//! {
//!     println!("{} face(s)", report.faces.len());
//!     if let Some(link) = report.annotated_image_link {
//!         println!("Annotated: {link}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Upstream failures are part of the JSON result:
//! `{"error": "not response", "code": ..., "msg": ...}` when no response
//! arrived, `{"error": <upstream body>}` for any non-200 status. Failing to
//! fetch or decode the caller's image, or a malformed upstream success
//! response, is an `Err` and the server answers `500`.
//!
//! ## Modules
//!
//! - [`config`] — Credentials, endpoints and server settings
//! - [`imaging`] — Fetching, JPEG/base64 encoding and face box drawing
//! - [`vision`] — Yandex Cloud OCR and batch analysis clients
//! - [`rehost`] — Image host trait and the Imgur implementation
//! - [`pipeline`] — The two end-to-end analysis pipelines
//! - [`server`] — axum routes

pub mod config;
pub mod imaging;
pub mod pipeline;
pub mod rehost;
pub mod server;
pub mod vision;
