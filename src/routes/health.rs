use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether the face models are loaded or present on disk.
    pub deepface_available: bool,
    /// Why the face models are unavailable, if they are.
    pub deepface_import_error: Option<String>,
}

/// GET /health — service status and face capability availability.
///
/// Checks model presence only; never loads models or runs inference.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let availability = state.faces.availability();

    Json(HealthResponse {
        status: "ok",
        deepface_available: availability.available,
        deepface_import_error: availability.reason,
    })
}
