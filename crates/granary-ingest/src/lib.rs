//! HTTP upload normalization
//!
//! Turns a raw HTTP upload (a single-body PUT or a multipart POST)
//! into one canonical [`ParsedUpload`] record for the needle store:
//! file name, MIME type, payload bytes (possibly gzipped), logical
//! size, custom metadata, optional TTL, and the chunked-manifest flag.
//!
//! Routing, persistence, and TTL enforcement live elsewhere; this crate
//! only interprets the inbound request. Every exit path, success or
//! failure, leaves the request body fully drained so the transport can
//! reuse the connection.

mod checksum;
mod multipart;
mod single_body;
mod sniff;

use std::collections::HashMap;

use axum::extract::{Query, Request};
use http::{HeaderMap, Method, Uri};
use serde::Deserialize;

use granary_core::compression::{
    decompress_data, gzip_data, CompressionClassifier, ExtensionClassifier, GZIP_KEEP_RATIO,
};
use granary_core::{AppError, ParsedUpload, Ttl};

/// Reserved metadata prefix. Header names arrive lowercased from the
/// `http` crate, so the prefix is matched (and stored) lowercase.
pub const PAIR_NAME_PREFIX: &str = "granary-";

/// Auxiliary upload parameters, sourced from the URL query string. The
/// multipart reader consumes the body before form values could be
/// parsed, so the query string is the only place these can live.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadParams {
    ts: Option<String>,
    ttl: Option<String>,
    cm: Option<String>,
}

impl UploadParams {
    fn from_uri(uri: &Uri) -> UploadParams {
        Query::<UploadParams>::try_from_uri(uri)
            .map(|q| q.0)
            .unwrap_or_default()
    }
}

/// Normalize an upload request using the default compression policy.
///
/// See [`parse_upload_with`] for details.
pub async fn parse_upload(req: Request, size_limit: usize) -> Result<ParsedUpload, AppError> {
    parse_upload_with(req, size_limit, &ExtensionClassifier).await
}

/// Normalize an upload request into a [`ParsedUpload`].
///
/// POST requests are treated as multipart envelopes; anything else is
/// read as a single raw body. `size_limit` caps the payload: a payload
/// that reaches `size_limit + 1` bytes fails with
/// [`AppError::PayloadTooLarge`]. `classifier` decides whether fresh
/// content is worth gzipping before storage.
pub async fn parse_upload_with(
    req: Request,
    size_limit: usize,
    classifier: &dyn CompressionClassifier,
) -> Result<ParsedUpload, AppError> {
    let mut pu = ParsedUpload::default();
    collect_pair_map(req.headers(), &mut pu.pair_map);
    let params = UploadParams::from_uri(req.uri());

    if req.method() == Method::POST {
        multipart::parse_multipart(req, size_limit, &params, &mut pu).await?;
    } else {
        single_body::parse_single_body(req, size_limit, &mut pu).await?;
    }

    finalize(&mut pu, &params, classifier);
    Ok(pu)
}

/// Collect headers under the reserved metadata prefix. First occurrence
/// per key wins; values that are not valid UTF-8 are skipped.
fn collect_pair_map(headers: &HeaderMap, pair_map: &mut HashMap<String, String>) {
    for (name, value) in headers {
        if name.as_str().starts_with(PAIR_NAME_PREFIX) {
            if let Ok(value) = value.to_str() {
                pair_map
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }
}

/// Type/Time Finalizer and Compression Negotiator: best-effort
/// auxiliary fields, MIME sniffing, and the store-compressed decision.
fn finalize(pu: &mut ParsedUpload, params: &UploadParams, classifier: &dyn CompressionClassifier) {
    pu.modified_time = params
        .ts
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    pu.ttl = params
        .ttl
        .as_deref()
        .and_then(|s| Ttl::read(s).ok().flatten());

    pu.original_data_size = pu.data.len();
    pu.uncompressed_data = pu.data.clone();

    if pu.mime_type.is_empty() {
        pu.mime_type = sniff::detect_content_type(&pu.data);
    }

    if pu.is_gzipped {
        // Best-effort: an undecodable body keeps its declared encoding
        // and the stored size doubles as the logical size.
        if let Ok(unzipped) = decompress_data(&pu.data) {
            pu.original_data_size = unzipped.len();
            pu.uncompressed_data = unzipped.into();
        }
    } else {
        let ext = sniff::file_extension(&pu.file_name);
        let (should_compress, confident) = classifier.classify(&ext, &pu.mime_type);
        if (pu.mime_type.is_empty() && !confident) || (should_compress && confident) {
            if let Ok(compressed) = gzip_data(&pu.data) {
                if compressed.len() * GZIP_KEEP_RATIO.0 < pu.data.len() * GZIP_KEEP_RATIO.1 {
                    tracing::debug!(
                        original = pu.data.len(),
                        compressed = compressed.len(),
                        file_name = %pu.file_name,
                        "storing gzipped payload"
                    );
                    pu.data = compressed.into();
                    pu.is_gzipped = true;
                }
            }
        }
    }
}

/// Go-compatible boolean text: accepts 1/t/T/TRUE/true/True and
/// 0/f/F/FALSE/false/False, nothing else.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
