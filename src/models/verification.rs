use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Request body for `POST /verify`.
///
/// Each image is either a data URI (`data:image/jpeg;base64,...`) or bare base64.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    #[garde(length(min = 1))]
    pub id_image: String,

    #[garde(length(min = 1))]
    pub selfie_image: String,
}

/// Which of the two submitted images an error or log line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ImageRole {
    #[strum(serialize = "idImage")]
    Id,
    #[strum(serialize = "selfieImage")]
    Selfie,
}

/// Coarse confidence bucket derived from distance relative to threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Successful verification response.
///
/// Metric fields are `None` when the comparison produced a non-finite distance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResult {
    pub success: bool,
    #[serde(rename = "match")]
    pub is_match: Option<bool>,
    pub similarity: Option<f64>,
    pub distance: Option<f64>,
    pub threshold: Option<f64>,
    pub confidence: Option<Confidence>,
    pub model: String,
    pub detector_backend: String,
    pub message: String,
}

/// Body returned for every failed verification, whatever the status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationFailure {
    pub success: bool,
    pub error: String,
    pub details: String,
    #[serde(rename = "match")]
    pub is_match: bool,
}

impl VerificationFailure {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: details.into(),
            is_match: false,
        }
    }
}
