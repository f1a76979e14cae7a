//! Face Verification Service
//!
//! This library provides the core functionality for the face-verify service,
//! which compares the face on an identity document against a selfie using
//! SCRFD detection and ArcFace embeddings running on ONNX Runtime.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
