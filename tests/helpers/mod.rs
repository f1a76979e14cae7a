//! Test helper utilities for driving the router in-process

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use face_verify::app_state::AppState;
use face_verify::config::AppConfig;
use face_verify::routes;
use face_verify::services::face::{Availability, Comparison, FaceComparator, FaceError};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// What the stub comparator answers with.
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Distance(f64),
    NoFace,
    MultipleFaces(usize),
    ModelMissing,
    Inference,
}

/// Deterministic stand-in for the ONNX comparator.
pub struct StubComparator {
    outcome: StubOutcome,
    pub calls: Arc<AtomicUsize>,
}

impl StubComparator {
    pub fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FaceComparator for StubComparator {
    fn compare(
        &self,
        _id_image: &DynamicImage,
        _selfie_image: &DynamicImage,
    ) -> Result<Comparison, FaceError> {
        use face_verify::models::verification::ImageRole;

        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            StubOutcome::Distance(distance) => Ok(Comparison {
                distance,
                threshold: 0.68,
                model: "ArcFace".to_string(),
                detector_backend: "scrfd".to_string(),
            }),
            StubOutcome::NoFace => Err(FaceError::NoFaceDetected(ImageRole::Selfie)),
            StubOutcome::MultipleFaces(count) => Err(FaceError::MultipleFaces {
                role: ImageRole::Id,
                count,
            }),
            StubOutcome::ModelMissing => {
                Err(FaceError::ModelLoad("det_10g.onnx not found".to_string()))
            }
            StubOutcome::Inference => Err(FaceError::Inference("tensor shape mismatch".to_string())),
        }
    }

    fn availability(&self) -> Availability {
        match self.outcome {
            StubOutcome::ModelMissing => Availability::unavailable("missing model files: det_10g.onnx"),
            _ => Availability::ready(),
        }
    }

    fn model_name(&self) -> &str {
        "ArcFace"
    }

    fn detector_backend(&self) -> &str {
        "scrfd"
    }
}

pub fn test_config() -> AppConfig {
    envy::from_iter(Vec::<(String, String)>::new()).expect("default config")
}

/// Router wired to a stub comparator; returns the call counter alongside.
pub fn test_app(outcome: StubOutcome) -> (Router, Arc<AtomicUsize>) {
    let comparator = StubComparator::new(outcome);
    let calls = Arc::clone(&comparator.calls);
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = routes::app(AppState::new(comparator), Arc::new(handle), &test_config());
    (app, calls)
}

/// A small PNG encoded as bare base64.
pub fn png_base64() -> String {
    let img = RgbImage::from_pixel(16, 16, Rgb([180, 140, 120]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    STANDARD.encode(buf.into_inner())
}

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", png_base64())
}

pub fn verify_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/verify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// Send a request and return status plus parsed JSON body.
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}
