use image::DynamicImage;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, TryLockError};

use super::detector::{BoundingBox, FaceDetector};
use super::embedding::Embedding;
use super::recognizer::FaceRecognizer;
use super::{Availability, Comparison, FaceComparator, FaceError};
use crate::models::verification::ImageRole;

pub const SCRFD_MODEL_FILE: &str = "det_10g.onnx";
pub const ARCFACE_MODEL_FILE: &str = "w600k_r50.onnx";

const MODEL_NAME: &str = "ArcFace";
const DETECTOR_BACKEND: &str = "scrfd";

/// Settings for the ONNX comparator, usually built from `AppConfig`.
#[derive(Debug, Clone)]
pub struct OnnxSettings {
    pub model_dir: PathBuf,
    pub match_threshold: f64,
    pub detection_confidence: f32,
    pub reject_multiple_faces: bool,
}

impl OnnxSettings {
    pub fn detector_path(&self) -> PathBuf {
        self.model_dir.join(SCRFD_MODEL_FILE)
    }

    pub fn recognizer_path(&self) -> PathBuf {
        self.model_dir.join(ARCFACE_MODEL_FILE)
    }
}

/// ORT sessions need exclusive access per run, so each gets its own lock.
struct LoadedModels {
    detector: Mutex<FaceDetector>,
    recognizer: Mutex<FaceRecognizer>,
}

impl LoadedModels {
    fn load(settings: &OnnxSettings) -> Result<Self, FaceError> {
        let detector = FaceDetector::load(&settings.detector_path(), settings.detection_confidence)
            .map_err(|e| FaceError::ModelLoad(e.to_string()))?;
        let recognizer = FaceRecognizer::load(&settings.recognizer_path())
            .map_err(|e| FaceError::ModelLoad(e.to_string()))?;

        Ok(Self {
            detector: Mutex::new(detector),
            recognizer: Mutex::new(recognizer),
        })
    }
}

/// SCRFD + ArcFace comparator with lazily loaded models.
///
/// Models load on the first `compare` call. Concurrent first calls wait on the
/// same lock so the load happens once; a failed load is retried next time.
pub struct OnnxFaceComparator {
    settings: OnnxSettings,
    models: Mutex<Option<Arc<LoadedModels>>>,
}

impl OnnxFaceComparator {
    pub fn new(settings: OnnxSettings) -> Self {
        Self {
            settings,
            models: Mutex::new(None),
        }
    }

    /// Load models now instead of on the first request.
    pub fn warm_up(&self) -> Result<(), FaceError> {
        self.models().map(|_| ())
    }

    fn models(&self) -> Result<Arc<LoadedModels>, FaceError> {
        let mut slot = self
            .models
            .lock()
            .map_err(|_| FaceError::ModelLoad("model slot lock poisoned".to_string()))?;

        if let Some(models) = slot.as_ref() {
            return Ok(Arc::clone(models));
        }

        tracing::info!(model_dir = %self.settings.model_dir.display(), "loading face models");
        let models = Arc::new(LoadedModels::load(&self.settings)?);
        *slot = Some(Arc::clone(&models));
        Ok(models)
    }

    /// Never waits on the slot: while a load holds the lock this reports
    /// `false` and callers fall back to checking the model files.
    fn is_loaded(&self) -> bool {
        match self.models.try_lock() {
            Ok(slot) => slot.is_some(),
            Err(TryLockError::WouldBlock) | Err(TryLockError::Poisoned(_)) => false,
        }
    }

    fn embed(
        &self,
        models: &LoadedModels,
        image: &DynamicImage,
        role: ImageRole,
    ) -> Result<Embedding, FaceError> {
        let rgb = image.to_rgb8();

        let faces = models
            .detector
            .lock()
            .map_err(|_| FaceError::Inference("detector lock poisoned".to_string()))?
            .detect(&rgb)
            .map_err(|e| FaceError::Inference(e.to_string()))?;

        let face = select_face(faces, role, self.settings.reject_multiple_faces)?;
        tracing::debug!(
            image = %role,
            confidence = face.confidence,
            width = face.width,
            height = face.height,
            "face selected"
        );

        models
            .recognizer
            .lock()
            .map_err(|_| FaceError::Inference("recognizer lock poisoned".to_string()))?
            .extract(&rgb, &face)
            .map_err(|e| FaceError::Inference(e.to_string()))
    }
}

impl FaceComparator for OnnxFaceComparator {
    fn compare(
        &self,
        id_image: &DynamicImage,
        selfie_image: &DynamicImage,
    ) -> Result<Comparison, FaceError> {
        let models = self.models()?;
        let id_embedding = self.embed(&models, id_image, ImageRole::Id)?;
        let selfie_embedding = self.embed(&models, selfie_image, ImageRole::Selfie)?;

        Ok(Comparison {
            distance: f64::from(id_embedding.cosine_distance(&selfie_embedding)),
            threshold: self.settings.match_threshold,
            model: MODEL_NAME.to_string(),
            detector_backend: DETECTOR_BACKEND.to_string(),
        })
    }

    fn availability(&self) -> Availability {
        if self.is_loaded() {
            return Availability::ready();
        }

        let missing: Vec<String> = [self.settings.detector_path(), self.settings.recognizer_path()]
            .into_iter()
            .filter(|path| !path.exists())
            .map(|path| path.display().to_string())
            .collect();

        if missing.is_empty() {
            Availability::ready()
        } else {
            Availability::unavailable(format!("missing model files: {}", missing.join(", ")))
        }
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn detector_backend(&self) -> &str {
        DETECTOR_BACKEND
    }
}

/// Pick the face to embed from detections sorted by confidence.
fn select_face(
    faces: Vec<BoundingBox>,
    role: ImageRole,
    reject_multiple: bool,
) -> Result<BoundingBox, FaceError> {
    match faces.len() {
        0 => Err(FaceError::NoFaceDetected(role)),
        count if count > 1 && reject_multiple => Err(FaceError::MultipleFaces { role, count }),
        count => {
            if count > 1 {
                tracing::debug!(image = %role, count, "multiple faces detected, using most confident");
            }
            faces
                .into_iter()
                .next()
                .ok_or(FaceError::NoFaceDetected(role))
        }
    }
}
