#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    http::{HeaderMap, StatusCode, header},
    routing::{MethodRouter, get, post},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use yc_vision_api::config::Config;

pub const IAM_TOKEN: &str = "t1.test-token";
pub const FOLDER_ID: &str = "b1gtestfolder";
pub const IMGUR_CLIENT_ID: &str = "client-42";
pub const HOSTED_LINK: &str = "https://i.imgur.com/fixed.jpeg";

/// Requests seen by a mock endpoint.
pub type Seen = Arc<Mutex<Vec<(HeaderMap, Bytes)>>>;

/// Serve `app` on an ephemeral local port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// 64x64 white PNG.
pub fn white_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]));
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

/// Gradient PNG, big enough that decoding it takes real CPU time.
pub fn large_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

/// Routes serving a valid image, a corrupt one, and a 404.
pub fn image_routes() -> Router {
    let png = white_png();
    Router::new()
        .route(
            "/image.png",
            get(move || {
                let png = png.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route(
            "/broken.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], "not a png") }),
        )
        .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
}

/// POST endpoint answering `status` with `reply`, recording every request.
pub fn recording(status: StatusCode, reply: Value, seen: Seen) -> MethodRouter {
    post(move |headers: HeaderMap, body: Bytes| {
        let seen = seen.clone();
        let reply = reply.clone();
        async move {
            seen.lock().unwrap().push((headers, body));
            (status, Json(reply))
        }
    })
}

pub fn ocr_reply(text: &str) -> Value {
    json!({
        "result": {
            "textAnnotation": {
                "width": "64",
                "height": "64",
                "blocks": [],
                "fullText": text
            },
            "page": "0"
        }
    })
}

pub fn properties() -> Value {
    json!([
        {"name": "adult", "probability": 0.001},
        {"name": "gruesome", "probability": 0.002},
        {"name": "text", "probability": 0.4},
        {"name": "watermarks", "probability": 0.05}
    ])
}

pub fn vision_reply(faces: Value) -> Value {
    json!({
        "results": [{
            "results": [
                {"classification": {"properties": properties()}},
                {"faceDetection": faces}
            ]
        }]
    })
}

pub fn one_face() -> Value {
    json!({
        "faces": [{
            "boundingBox": {
                "vertices": [
                    {"x": "10", "y": "10"},
                    {"x": "20", "y": "10"},
                    {"x": "30", "y": "40"},
                    {"x": "10", "y": "40"}
                ]
            }
        }]
    })
}

pub fn two_faces() -> Value {
    let face = |(left, top): (i32, i32), (right, bottom): (i32, i32)| {
        json!({
            "boundingBox": {
                "vertices": [
                    {"x": left.to_string(), "y": top.to_string()},
                    {"x": right.to_string(), "y": top.to_string()},
                    {"x": right.to_string(), "y": bottom.to_string()},
                    {"x": left.to_string(), "y": bottom.to_string()}
                ]
            }
        })
    };
    json!({"faces": [face((5, 5), (15, 20)), face((35, 30), (55, 50))]})
}

pub fn imgur_reply() -> Value {
    json!({
        "data": {"id": "fixed", "link": HOSTED_LINK, "type": "image/jpeg"},
        "success": true,
        "status": 200
    })
}

/// Config pointing every upstream at `addr`.
pub fn config_for(addr: SocketAddr) -> Config {
    let mut config = Config::default();
    config.yandex.iam_token = IAM_TOKEN.to_string();
    config.yandex.folder_id = FOLDER_ID.to_string();
    config.yandex.ocr_url = format!("http://{addr}/ocr");
    config.yandex.vision_url = format!("http://{addr}/vision");
    config.imgur.client_id = IMGUR_CLIENT_ID.to_string();
    config.imgur.upload_url = format!("http://{addr}/imgur");
    config.server.default_image_url = format!("http://{addr}/image.png");
    config
}

pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
}
