//! Multipart (POST-style) acquisition and section resolution

use axum::extract::multipart::{Field, Multipart};
use axum::extract::{FromRequest, Request};
use http::header;

use granary_core::{AppError, ParsedUpload};

use crate::checksum::SectionSink;
use crate::sniff;
use crate::UploadParams;

/// Expected-checksum headers are matched lowercase, like all header
/// names under the `http` crate.
const CHECKSUM_HEADER: &str = "content-md5";

/// Open the multipart envelope and resolve it into `pu`. Whatever
/// sections remain unread afterwards, on success or on a fatal error,
/// are drained so the connection can be reused.
pub(crate) async fn parse_multipart(
    req: Request,
    size_limit: usize,
    params: &UploadParams,
    pu: &mut ParsedUpload,
) -> Result<(), AppError> {
    let expected_checksum = req
        .headers()
        .get(CHECKSUM_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut multipart = Multipart::from_request(req, &()).await.map_err(|e| {
        tracing::warn!(error = %e, "opening multipart reader failed");
        AppError::Multipart(e.to_string())
    })?;

    let result = resolve_sections(
        &mut multipart,
        size_limit,
        expected_checksum.as_deref(),
        params,
        pu,
    )
    .await;
    drain(&mut multipart).await;
    result
}

/// Read the mandatory primary section, scan forward for a named section
/// when the primary has no file name, then settle the MIME type and
/// gzip flag from the primary section's headers.
async fn resolve_sections(
    multipart: &mut Multipart,
    size_limit: usize,
    expected_checksum: Option<&str>,
    params: &UploadParams,
    pu: &mut ParsedUpload,
) -> Result<(), AppError> {
    let mut field = multipart
        .next_field()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "reading first multipart section failed");
            AppError::Multipart(e.to_string())
        })?
        .ok_or_else(|| AppError::Multipart("multipart request has no sections".to_string()))?;

    pu.file_name = field
        .file_name()
        .map(sniff::base_name)
        .unwrap_or_default();
    // Captured now: the primary section's headers stay authoritative
    // even if a later section replaces the payload.
    let primary_content_type = field.content_type().map(str::to_string).unwrap_or_default();
    let primary_gzipped = field
        .headers()
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes() == b"gzip");

    match expected_checksum {
        Some(expected) => {
            let (data, actual) =
                read_section_checked(&mut field, size_limit, primary_gzipped).await?;
            if expected != actual {
                return Err(AppError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
            pu.data = data.into();
        }
        None => {
            pu.data = read_section(&mut field, size_limit).await?.into();
        }
    }
    drop(field);

    // The primary section had no file name: scan forward, discarding
    // unnamed sections, until one carries a name. The first match
    // replaces both the payload and the file name; nothing after it is
    // consulted. Running out of sections is not an error.
    while pu.file_name.is_empty() {
        match multipart.next_field().await {
            Ok(Some(mut candidate)) => {
                let candidate_name = candidate
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_default();
                if candidate_name.is_empty() {
                    continue;
                }
                pu.data = read_section(&mut candidate, size_limit).await?.into();
                pu.file_name = sniff::base_name(&candidate_name);
                break;
            }
            Ok(None) | Err(_) => break,
        }
    }

    pu.is_chunked_file = params
        .cm
        .as_deref()
        .and_then(crate::parse_bool)
        .unwrap_or(false);

    if !pu.is_chunked_file {
        let ext = sniff::file_extension(&pu.file_name);
        let guessed = sniff::mime_by_extension(&ext);
        // An explicit section content-type wins only when it adds
        // information: non-empty, not the generic placeholder, and not
        // already deducible from the extension.
        if !primary_content_type.is_empty()
            && primary_content_type != sniff::GENERIC_MIME
            && primary_content_type != guessed
        {
            pu.mime_type = primary_content_type;
        }
        pu.is_gzipped = primary_gzipped;
    }

    Ok(())
}

/// Read one section capped at `size_limit + 1` bytes; reaching the cap
/// is the size-limit violation.
async fn read_section(field: &mut Field<'_>, size_limit: usize) -> Result<Vec<u8>, AppError> {
    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = next_chunk(field).await? {
        let room = size_limit + 1 - data.len();
        if chunk.len() >= room {
            data.extend_from_slice(&chunk[..room]);
            break;
        }
        data.extend_from_slice(&chunk);
    }
    if data.len() == size_limit + 1 {
        return Err(AppError::PayloadTooLarge(size_limit));
    }
    Ok(data)
}

/// Like [`read_section`], but every byte feeds an incremental MD5 on
/// its way into the buffer, optionally through a streaming gzip decoder
/// when the section declared a compressed encoding. The cap applies to
/// the raw bytes read off the wire, and takes precedence over both
/// decode failures and the digest comparison.
async fn read_section_checked(
    field: &mut Field<'_>,
    size_limit: usize,
    gzipped: bool,
) -> Result<(Vec<u8>, String), AppError> {
    let mut sink = SectionSink::new(gzipped);
    let mut raw_len = 0usize;
    while let Some(chunk) = next_chunk(field).await? {
        let take = chunk.len().min(size_limit + 1 - raw_len);
        sink.write_chunk(&chunk[..take])?;
        raw_len += take;
        if raw_len == size_limit + 1 {
            return Err(AppError::PayloadTooLarge(size_limit));
        }
    }
    sink.finish()
}

async fn next_chunk(field: &mut Field<'_>) -> Result<Option<bytes::Bytes>, AppError> {
    field.chunk().await.map_err(|e| {
        tracing::warn!(error = %e, "reading multipart section content failed");
        AppError::Multipart(e.to_string())
    })
}

/// Consume whatever sections and bytes remain in the envelope.
async fn drain(multipart: &mut Multipart) {
    loop {
        match multipart.next_field().await {
            Ok(Some(mut field)) => while let Ok(Some(_)) = field.chunk().await {},
            Ok(None) | Err(_) => break,
        }
    }
}
