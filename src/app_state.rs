use std::sync::Arc;

use crate::services::face::FaceComparator;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub faces: Arc<dyn FaceComparator>,
}

impl AppState {
    pub fn new(faces: impl FaceComparator + 'static) -> Self {
        Self {
            faces: Arc::new(faces),
        }
    }
}
