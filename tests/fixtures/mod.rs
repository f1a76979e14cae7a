//! Face image fixtures for tests that need real models
//!
//! Images are not checked in. Point FACE_FIXTURES_DIR at a directory holding
//! the files named below (default: tests/fixtures/faces).

#![allow(dead_code)]

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpectedOutcome {
    Match,
    NoMatch,
    NoFace,
}

#[derive(Debug, Clone)]
pub struct FacePairFixture {
    pub id_image: &'static str,
    pub selfie_image: &'static str,
    pub expected: ExpectedOutcome,
    pub description: &'static str,
}

pub const FACE_PAIR_FIXTURES: &[FacePairFixture] = &[
    FacePairFixture {
        id_image: "person_a_id.jpg",
        selfie_image: "person_a_selfie.jpg",
        expected: ExpectedOutcome::Match,
        description: "same person, ID card vs selfie",
    },
    FacePairFixture {
        id_image: "person_a_id.jpg",
        selfie_image: "person_b_selfie.jpg",
        expected: ExpectedOutcome::NoMatch,
        description: "different people",
    },
    FacePairFixture {
        id_image: "person_a_id.jpg",
        selfie_image: "no_face.jpg",
        expected: ExpectedOutcome::NoFace,
        description: "selfie without a face",
    },
];

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FACE_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests")
                .join("fixtures")
                .join("faces")
        })
}

/// Check an HTTP status and response body against a fixture's expectation.
pub fn assert_outcome(fixture: &FacePairFixture, status: u16, body: &serde_json::Value) {
    assert_eq!(status, 200, "unexpected status for {}: {body}", fixture.description);
    match fixture.expected {
        ExpectedOutcome::Match => {
            assert_eq!(body["match"], true, "{}: {body}", fixture.description);
            let distance = body["distance"].as_f64().unwrap_or(f64::MAX);
            let threshold = body["threshold"].as_f64().unwrap_or(0.0);
            assert!(distance <= threshold, "{}: {body}", fixture.description);
        }
        ExpectedOutcome::NoMatch => {
            assert_eq!(body["success"], true, "{}: {body}", fixture.description);
            assert_eq!(body["match"], false, "{}: {body}", fixture.description);
        }
        ExpectedOutcome::NoFace => {
            assert_eq!(body["success"], false, "{}: {body}", fixture.description);
            assert_eq!(body["match"], false, "{}: {body}", fixture.description);
        }
    }
}
