use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::verification::VerificationFailure;
use crate::services::decode::DecodeError;
use crate::services::face::FaceError;

/// Everything `POST /verify` can fail with, mapped onto status and body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Face(#[from] FaceError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            // Face problems are a verdict on the input, not a transport failure.
            ApiError::Face(FaceError::NoFaceDetected(_) | FaceError::MultipleFaces { .. }) => {
                StatusCode::OK
            }
            ApiError::Face(FaceError::ModelLoad(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Face(FaceError::Inference(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label for the `face_verifications_total` counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Decode(_) => "decode_error",
            ApiError::Face(FaceError::NoFaceDetected(_)) => "no_face",
            ApiError::Face(FaceError::MultipleFaces { .. }) => "multiple_faces",
            ApiError::Face(FaceError::ModelLoad(_)) => "unavailable",
            ApiError::Face(FaceError::Inference(_)) | ApiError::Internal(_) => "internal_error",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "Invalid Request",
            ApiError::Decode(_) => "Image decode failed",
            ApiError::Face(FaceError::NoFaceDetected(_)) => "No face detected",
            ApiError::Face(FaceError::MultipleFaces { .. }) => "Multiple faces detected",
            ApiError::Face(FaceError::ModelLoad(_)) => "Service Unavailable",
            ApiError::Face(FaceError::Inference(_)) | ApiError::Internal(_) => {
                "Internal Server Error"
            }
        }
    }

    fn details(&self) -> String {
        match self {
            ApiError::InvalidRequest(reason) => reason.clone(),
            ApiError::Decode(err) => format!("Could not decode image data: {err}"),
            ApiError::Face(FaceError::NoFaceDetected(role)) => format!(
                "Could not detect a face in {role}. Please ensure the face is clear and unobstructed."
            ),
            ApiError::Face(FaceError::MultipleFaces { role, count }) => format!(
                "Detected {count} faces in {role}. Please ensure only one face is present."
            ),
            ApiError::Face(FaceError::ModelLoad(_)) => {
                "Face verification component is not available.".to_string()
            }
            ApiError::Face(FaceError::Inference(err)) => err.clone(),
            ApiError::Internal(_) => {
                "An unexpected error occurred during processing.".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "verification failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "verification rejected");
        }

        let body = VerificationFailure::new(self.title(), self.details());
        (status, Json(body)).into_response()
    }
}
