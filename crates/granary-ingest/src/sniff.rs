//! MIME and file-name helpers

/// The generic placeholder type; never stored on a `ParsedUpload`.
pub(crate) const GENERIC_MIME: &str = "application/octet-stream";

/// Sniff a MIME type from the leading payload bytes. Unknown content
/// (and the generic placeholder, should a matcher ever produce it)
/// yields an empty string so downstream defaults apply.
pub(crate) fn detect_content_type(data: &[u8]) -> String {
    match infer::get(data) {
        Some(kind) if kind.mime_type() != GENERIC_MIME => kind.mime_type().to_string(),
        _ => String::new(),
    }
}

/// Strip directory components from a client-supplied file name.
pub(crate) fn base_name(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// Lowercased extension including the leading dot; empty when the name
/// has no extension or starts with the only dot.
pub(crate) fn file_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(i) if i > 0 => file_name[i..].to_lowercase(),
        _ => String::new(),
    }
}

/// Extension-derived MIME type; empty when the extension is unknown.
pub(crate) fn mime_by_extension(ext: &str) -> String {
    if ext.is_empty() {
        return String::new();
    }
    mime_guess::from_ext(&ext[1..])
        .first_raw()
        .map(str::to_string)
        .unwrap_or_default()
}
