use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// GET / — liveness message.
pub async fn read_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Face Verification Microservice is running",
    })
}
