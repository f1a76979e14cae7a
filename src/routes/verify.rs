use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use garde::Validate;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::verification::{ImageRole, VerificationRequest, VerificationResult};
use crate::routes::error::ApiError;
use crate::services::decode::{self, DecodeError};
use crate::services::face::FaceError;
use crate::services::scoring;

/// POST /verify — compare the face on an ID image against a selfie.
pub async fn verify_faces(
    State(state): State<AppState>,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, ApiError> {
    let started = Instant::now();
    let span = tracing::info_span!("verify", request_id = %Uuid::new_v4());

    let outcome = run_verification(state, payload).instrument(span).await;

    let label = match &outcome {
        Ok(result) if result.is_match == Some(true) => "match",
        Ok(_) => "no_match",
        Err(err) => err.outcome(),
    };
    metrics::counter!("face_verifications_total", "outcome" => label).increment(1);
    metrics::histogram!("face_verification_seconds").record(started.elapsed().as_secs_f64());

    outcome.map(Json)
}

async fn run_verification(
    state: AppState,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<VerificationResult, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    request
        .validate()
        .map_err(|report| ApiError::InvalidRequest(report.to_string()))?;

    tracing::info!(
        id_image_len = request.id_image.len(),
        selfie_image_len = request.selfie_image.len(),
        "received verification request"
    );

    let availability = state.faces.availability();
    if !availability.available {
        let reason = availability
            .reason
            .unwrap_or_else(|| "face models unavailable".to_string());
        return Err(ApiError::from(FaceError::ModelLoad(reason)));
    }

    let faces = Arc::clone(&state.faces);
    let comparison = tokio::task::spawn_blocking(move || {
        let id_image = decode::decode_image(ImageRole::Id, &request.id_image)
            .inspect_err(log_decode_failure)?;
        let selfie_image = decode::decode_image(ImageRole::Selfie, &request.selfie_image)
            .inspect_err(log_decode_failure)?;
        tracing::debug!(
            id = ?(id_image.width(), id_image.height()),
            selfie = ?(selfie_image.width(), selfie_image.height()),
            "images decoded"
        );
        faces
            .compare(&id_image, &selfie_image)
            .map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))??;

    let result = scoring::classify(&comparison);
    let confidence = result.confidence.map(|c| c.to_string());
    tracing::info!(
        distance = comparison.distance,
        threshold = comparison.threshold,
        matched = ?result.is_match,
        confidence = confidence.as_deref(),
        model = %comparison.model,
        "verification complete"
    );

    Ok(result)
}

fn log_decode_failure(err: &DecodeError) {
    tracing::debug!(image = %err.role(), error = %err, "image decode failed");
}
