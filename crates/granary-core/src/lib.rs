//! Granary Core Library
//!
//! This crate provides the domain model, error types, TTL syntax, and
//! compression policy shared by the Granary upload pipeline.

pub mod compression;
pub mod error;
pub mod models;
pub mod ttl;

// Re-export commonly used types
pub use compression::{
    decompress_data, gzip_data, CompressionClassifier, ExtensionClassifier, GZIP_KEEP_RATIO,
};
pub use error::AppError;
pub use models::ParsedUpload;
pub use ttl::{Ttl, TtlUnit};
