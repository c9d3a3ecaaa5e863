//! Single-body (PUT-style) acquisition

use axum::body::BodyDataStream;
use axum::extract::Request;
use futures::StreamExt;
use http::header;

use granary_core::{AppError, ParsedUpload};

/// Read a raw request body, capped at `size_limit + 1` bytes. MIME type
/// and gzip flag come verbatim from the request headers; single-body
/// uploads never carry a file name.
pub(crate) async fn parse_single_body(
    req: Request,
    size_limit: usize,
    pu: &mut ParsedUpload,
) -> Result<(), AppError> {
    pu.is_gzipped = req
        .headers()
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes() == b"gzip");
    pu.mime_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    pu.file_name = String::new();

    let mut stream = req.into_body().into_data_stream();
    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!(error = %e, "reading request body failed");
            AppError::Io(std::io::Error::other(e))
        })?;
        let room = size_limit + 1 - data.len();
        if chunk.len() >= room {
            data.extend_from_slice(&chunk[..room]);
            break;
        }
        data.extend_from_slice(&chunk);
    }

    if data.len() == size_limit + 1 {
        // Leave the connection reusable before reporting the violation.
        drain(stream).await;
        return Err(AppError::PayloadTooLarge(size_limit));
    }

    pu.data = data.into();
    Ok(())
}

/// Consume whatever the client is still sending.
async fn drain(mut stream: BodyDataStream) {
    while let Some(chunk) = stream.next().await {
        if chunk.is_err() {
            break;
        }
    }
}
