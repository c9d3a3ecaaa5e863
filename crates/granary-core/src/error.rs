//! Error types module
//!
//! All upload-normalization failures are unified under the `AppError`
//! enum. The display strings of the `PayloadTooLarge`, `ChecksumMismatch`
//! and `InvalidGzip` variants are load-bearing: downstream servers and
//! clients match on them, so they must not be reworded.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("file over the limited {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Content-MD5 did not match md5 of file data [{expected}] != [{actual}]")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Content-Encoding == gzip but content was not gzipped: {0}")]
    InvalidGzip(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code the enclosing dispatch layer should map this
    /// error to.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_)
            | AppError::Multipart(_)
            | AppError::ChecksumMismatch { .. }
            | AppError::InvalidGzip(_) => 400,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Io(_) | AppError::Internal(_) => 500,
        }
    }

    /// Whether the client can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}
