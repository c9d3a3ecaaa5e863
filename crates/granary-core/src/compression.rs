//! Compression helpers and the gzippable-content policy
//!
//! The upload pipeline stores a compressed payload only when it pays
//! for itself: the compressed form must come in under
//! [`GZIP_KEEP_RATIO`] of the original size. Whether compression is
//! even attempted is decided by a [`CompressionClassifier`], which is a
//! pluggable seam so deployments can tune the policy without touching
//! the pipeline.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Keep the compressed form only if `compressed * 10 < original * 9`,
/// i.e. it saves at least 10%.
pub const GZIP_KEEP_RATIO: (usize, usize) = (10, 9);

/// Gzip-compress a payload.
pub fn gzip_data(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Gzip-decompress a payload.
pub fn decompress_data(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Policy seam answering "should this payload be gzipped before
/// storage?".
///
/// `classify` returns `(should_compress, confident)`. When the
/// classifier is not confident, the pipeline falls back to attempting
/// compression only for payloads whose MIME type is unknown.
pub trait CompressionClassifier: Send + Sync {
    /// `extension` is lowercase with a leading dot (or empty);
    /// `mime_type` is the current MIME type (or empty when unknown).
    fn classify(&self, extension: &str, mime_type: &str) -> (bool, bool);
}

/// Default policy based on well-known extensions and MIME families.
pub struct ExtensionClassifier;

impl CompressionClassifier for ExtensionClassifier {
    fn classify(&self, extension: &str, mime_type: &str) -> (bool, bool) {
        match extension {
            ".txt" | ".css" | ".js" | ".json" | ".html" | ".htm" | ".xml" | ".csv" | ".svg"
            | ".pdf" | ".md" | ".log" | ".conf" | ".yaml" | ".yml" | ".toml" => {
                return (true, true)
            }
            ".zip" | ".gz" | ".tgz" | ".bz2" | ".xz" | ".zst" | ".rar" | ".7z" | ".jpg"
            | ".jpeg" | ".png" | ".gif" | ".webp" | ".mp3" | ".mp4" | ".m4a" | ".mov"
            | ".avi" | ".mkv" | ".woff" | ".woff2" => return (false, true),
            _ => {}
        }
        if mime_type.starts_with("text/")
            || mime_type.ends_with("script")
            || mime_type.ends_with("json")
            || mime_type.ends_with("xml")
        {
            return (true, true);
        }
        if mime_type.starts_with("image/")
            || mime_type.starts_with("audio/")
            || mime_type.starts_with("video/")
        {
            return (false, true);
        }
        (false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_round_trip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = gzip_data(&original).unwrap();
        assert!(compressed.len() < original.len());
        assert_eq!(decompress_data(&compressed).unwrap(), original);
    }

    #[test]
    fn decompress_rejects_garbage() {
        assert!(decompress_data(b"definitely not gzip").is_err());
    }

    #[test]
    fn classifier_is_confident_about_text() {
        assert_eq!(ExtensionClassifier.classify(".css", ""), (true, true));
        assert_eq!(ExtensionClassifier.classify("", "text/plain"), (true, true));
        assert_eq!(
            ExtensionClassifier.classify("", "application/json"),
            (true, true)
        );
    }

    #[test]
    fn classifier_is_confident_about_compressed_media() {
        assert_eq!(ExtensionClassifier.classify(".jpg", ""), (false, true));
        assert_eq!(ExtensionClassifier.classify("", "image/jpeg"), (false, true));
        assert_eq!(ExtensionClassifier.classify(".zip", ""), (false, true));
    }

    #[test]
    fn classifier_hedges_on_unknown_content() {
        assert_eq!(ExtensionClassifier.classify(".dat", ""), (false, false));
        assert_eq!(ExtensionClassifier.classify("", ""), (false, false));
    }

    #[test]
    fn svg_mime_compresses_despite_image_family() {
        assert_eq!(
            ExtensionClassifier.classify("", "image/svg+xml"),
            (true, true)
        );
    }
}
