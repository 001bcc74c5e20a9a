// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for integration tests: fake detection models, encoded
//! images and a router wired to a temporary static directory.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockall::mock;
use snapdetect_server::{
    api::{create_router, AppState},
    vision::{
        ChannelOrder, ClassNameTable, DetectionModel, DetectionModelManager, InferencePolicy,
        PixelBox, RasterImage, RawDetection,
    },
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!doctype html><html><body><div id=\"root\"></div></body></html>";
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

mock! {
    pub Detector {}

    impl DetectionModel for Detector {
        fn name(&self) -> &str;
        fn class_names(&self) -> &ClassNameTable;
        fn channel_order(&self) -> ChannelOrder;
        fn infer(&self, image: &RasterImage) -> anyhow::Result<Vec<RawDetection>>;
    }
}

/// Returns a fixed detection list and counts calls
pub struct StubModel {
    labels: ClassNameTable,
    detections: Vec<RawDetection>,
    fail_with: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            labels: ClassNameTable::coco(),
            detections,
            fail_with: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_labels(mut self, labels: ClassNameTable) -> Self {
        self.labels = labels;
        self
    }

    /// Sleep this long inside every `infer` call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(vec![])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DetectionModel for StubModel {
    fn name(&self) -> &str {
        "YOLOv8n"
    }

    fn class_names(&self) -> &ClassNameTable {
        &self.labels
    }

    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    fn infer(&self, _image: &RasterImage) -> anyhow::Result<Vec<RawDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(self.detections.clone()),
        }
    }
}

pub fn raw(class_id: usize, confidence: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> RawDetection {
    RawDetection {
        class_id,
        confidence,
        bbox: PixelBox::new(x1, y1, x2, y2),
    }
}

pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf.into_inner()
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    data_uri("image/png", &encode_png(width, height))
}

/// Static directory containing only `index.html`
pub fn static_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).expect("write index.html");
    dir
}

pub fn state_for(model: Arc<dyn DetectionModel>) -> AppState {
    AppState::new(Arc::new(DetectionModelManager::new(
        model,
        InferencePolicy::Serialized,
    )))
}

pub fn app_for(model: Arc<dyn DetectionModel>, dir: &TempDir) -> Router {
    create_router(state_for(model), dir.path(), MAX_BODY_BYTES)
}

pub fn app_with_timeout(model: Arc<dyn DetectionModel>, dir: &TempDir, timeout: Duration) -> Router {
    let state = state_for(model).with_inference_timeout(Some(timeout));
    create_router(state, dir.path(), MAX_BODY_BYTES)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body.to_vec())
}

pub async fn post_detect(app: Router, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/detect")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("build request");
    let (status, bytes) = send(app, request).await;
    let json = serde_json::from_slice(&bytes).expect("JSON response body");
    (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}
