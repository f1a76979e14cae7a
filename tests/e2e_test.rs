//! End-to-end tests against a running server
//!
//! These tests require:
//! 1. The face-verify server running on the configured address
//! 2. SCRFD and ArcFace models installed in its FACE_MODEL_DIR (for the fixture test)
//! 3. Face fixture images in FACE_FIXTURES_DIR (for the fixture test)
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture
//!
//! Set API_BASE_URL to override default (http://localhost:8000)

mod fixtures;
mod helpers;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fixtures::*;
use helpers::png_base64;
use serde_json::json;

/// Get base URL from env or default to localhost
fn get_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[tokio::test]
#[ignore] // Requires running API server
async fn test_e2e_health_check() {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", get_base_url()))
        .send()
        .await
        .expect("Health check failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("health json");
    assert_eq!(body["status"], "ok");
    println!("✓ Health check passed (models available: {})", body["deepface_available"]);
}

#[tokio::test]
#[ignore] // Requires running API server
async fn test_e2e_malformed_base64() {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/verify", get_base_url()))
        .json(&json!({ "idImage": "%%%", "selfieImage": png_base64() }))
        .send()
        .await
        .expect("verify request failed");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("verify json");
    assert_eq!(body["success"], false);
    println!("✓ Malformed base64 rejected: {}", body["details"]);
}

#[tokio::test]
#[ignore] // Requires running API server, installed models and fixture images
async fn test_e2e_fixture_pairs() {
    let client = reqwest::Client::new();
    let dir = fixtures_dir();

    for fixture in FACE_PAIR_FIXTURES {
        let encode = |name: &str| {
            let bytes = std::fs::read(dir.join(name))
                .unwrap_or_else(|e| panic!("missing fixture {name}: {e}"));
            format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
        };

        let response = client
            .post(format!("{}/verify", get_base_url()))
            .json(&json!({
                "idImage": encode(fixture.id_image),
                "selfieImage": encode(fixture.selfie_image),
            }))
            .send()
            .await
            .expect("verify request failed");

        let status = response.status();
        let body: serde_json::Value = response.json().await.expect("verify json");
        assert_outcome(fixture, status.as_u16(), &body);
        println!("  ✓ {} - {}", fixture.description, body);
    }
}
