pub mod decode;
pub mod face;
pub mod scoring;
