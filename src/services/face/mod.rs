//! Face comparison capability.
//!
//! The verification handler only sees [`FaceComparator`]. The production
//! implementation, [`OnnxFaceComparator`], runs SCRFD detection, five-point
//! alignment and ArcFace embedding extraction on ONNX Runtime.

pub mod alignment;
pub mod detector;
pub mod embedding;
pub mod onnx;
pub mod recognizer;

use image::DynamicImage;

use crate::models::verification::ImageRole;

pub use onnx::OnnxFaceComparator;

/// Raw outcome of comparing the faces in two images.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Embedding-space distance between the two faces.
    pub distance: f64,
    /// Distance at or below which the faces count as the same person.
    pub threshold: f64,
    pub model: String,
    pub detector_backend: String,
}

/// Whether the capability can serve requests, as far as can be told without running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<String>,
}

impl Availability {
    pub fn ready() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}

/// A face-comparison backend.
///
/// Implementations are blocking and CPU-bound; callers run them off the async
/// runtime.
pub trait FaceComparator: Send + Sync {
    fn compare(
        &self,
        id_image: &DynamicImage,
        selfie_image: &DynamicImage,
    ) -> Result<Comparison, FaceError>;

    /// Must not load models or run inference.
    fn availability(&self) -> Availability;

    fn model_name(&self) -> &str;

    fn detector_backend(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    #[error("no face detected in {0}")]
    NoFaceDetected(ImageRole),

    #[error("{count} faces detected in {role}")]
    MultipleFaces { role: ImageRole, count: usize },

    #[error("face models could not be loaded: {0}")]
    ModelLoad(String),

    #[error("face inference failed: {0}")]
    Inference(String),
}
