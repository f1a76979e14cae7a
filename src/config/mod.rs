use serde::Deserialize;
use std::path::PathBuf;

use crate::services::face::onnx::OnnxSettings;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind host (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated list of origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// Directory holding `det_10g.onnx` and `w600k_r50.onnx`.
    #[serde(default = "default_model_dir")]
    pub face_model_dir: PathBuf,

    /// Cosine distance at or below which two faces are declared a match.
    #[serde(default = "default_match_threshold")]
    pub face_match_threshold: f64,

    /// Minimum SCRFD score for a detection to count as a face.
    #[serde(default = "default_detection_confidence")]
    pub face_detection_confidence: f32,

    /// Fail with a multiple-faces error instead of using the most confident face.
    #[serde(default)]
    pub face_reject_multiple: bool,

    /// Load face models at startup instead of on the first request.
    #[serde(default)]
    pub face_preload: bool,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> String {
    DEFAULT_ALLOWED_ORIGINS.to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_match_threshold() -> f64 {
    0.68
}

fn default_detection_confidence() -> f32 {
    0.5
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed CORS allow-list. Blank entries are dropped and an empty result
    /// falls back to the local development origins.
    pub fn allowed_origins(&self) -> Vec<String> {
        let origins = split_origins(&self.allowed_origins);
        if origins.is_empty() {
            tracing::warn!(
                "ALLOWED_ORIGINS resulted in an empty list; falling back to localhost defaults"
            );
            return split_origins(DEFAULT_ALLOWED_ORIGINS);
        }
        origins
    }

    pub fn onnx_settings(&self) -> OnnxSettings {
        OnnxSettings {
            model_dir: self.face_model_dir.clone(),
            match_threshold: self.face_match_threshold,
            detection_confidence: self.face_detection_confidence,
            reject_multiple_faces: self.face_reject_multiple,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .expect("config should deserialize")
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.face_model_dir, PathBuf::from("models"));
        assert!((config.face_match_threshold - 0.68).abs() < 1e-9);
        assert!(!config.face_reject_multiple);
        assert!(!config.face_preload);
        assert_eq!(config.max_body_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("HOST", "127.0.0.1"),
            ("FACE_MATCH_THRESHOLD", "0.55"),
            ("FACE_REJECT_MULTIPLE", "true"),
            ("FACE_MODEL_DIR", "/opt/models"),
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert!((config.face_match_threshold - 0.55).abs() < 1e-9);
        assert!(config.face_reject_multiple);

        let settings = config.onnx_settings();
        assert_eq!(settings.model_dir, PathBuf::from("/opt/models"));
        assert!(settings.reject_multiple_faces);
    }

    #[test]
    fn test_allowed_origins_trims_and_drops_blanks() {
        let config = config_from(&[(
            "ALLOWED_ORIGINS",
            " https://app.example.com , ,https://admin.example.com,",
        )]);
        assert_eq!(
            config.allowed_origins(),
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn test_blank_allowed_origins_falls_back_to_default() {
        let config = config_from(&[("ALLOWED_ORIGINS", " , ")]);
        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result: Result<AppConfig, _> =
            envy::from_iter(vec![("PORT".to_string(), "not-a-port".to_string())]);
        assert!(result.is_err());
    }
}
