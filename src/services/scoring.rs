use crate::models::verification::{Confidence, VerificationResult};
use crate::services::face::Comparison;

/// Distances at or below this fraction of the threshold are reported as high confidence.
const HIGH_CONFIDENCE_RATIO: f64 = 0.5;

const SIMILARITY_DECIMALS: i32 = 2;
const DISTANCE_DECIMALS: i32 = 4;

const MATCH_MESSAGE: &str = "Face verification successful.";
const NO_MATCH_MESSAGE: &str = "Faces do not appear to match.";
const NO_DISTANCE_MESSAGE: &str = "Face comparison did not produce a usable distance.";

/// Turn a raw comparison into the response returned to the caller.
///
/// - match: `distance <= threshold`
/// - similarity: `(1 - distance) * 100`, clamped to `[0, 100]`
/// - confidence: high within half the threshold, medium within the threshold, low beyond it
pub fn classify(comparison: &Comparison) -> VerificationResult {
    let Comparison {
        distance,
        threshold,
        model,
        detector_backend,
    } = comparison;

    if !distance.is_finite() || !threshold.is_finite() {
        return VerificationResult {
            success: true,
            is_match: None,
            similarity: None,
            distance: None,
            threshold: None,
            confidence: None,
            model: model.clone(),
            detector_backend: detector_backend.clone(),
            message: NO_DISTANCE_MESSAGE.to_string(),
        };
    }

    let is_match = distance <= threshold;

    VerificationResult {
        success: true,
        is_match: Some(is_match),
        similarity: Some(similarity(*distance)),
        distance: Some(round_to(*distance, DISTANCE_DECIMALS)),
        threshold: Some(round_to(*threshold, DISTANCE_DECIMALS)),
        confidence: Some(confidence(*distance, *threshold)),
        model: model.clone(),
        detector_backend: detector_backend.clone(),
        message: if is_match { MATCH_MESSAGE } else { NO_MATCH_MESSAGE }.to_string(),
    }
}

/// Similarity percentage for a cosine distance. Non-increasing in `distance`.
pub fn similarity(distance: f64) -> f64 {
    round_to(((1.0 - distance) * 100.0).clamp(0.0, 100.0), SIMILARITY_DECIMALS)
}

pub fn confidence(distance: f64, threshold: f64) -> Confidence {
    if distance <= threshold * HIGH_CONFIDENCE_RATIO {
        Confidence::High
    } else if distance <= threshold {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
