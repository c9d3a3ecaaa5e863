//! The canonical upload record

use std::collections::HashMap;

use bytes::Bytes;

use crate::ttl::Ttl;

/// A normalized upload, ready for the needle store.
///
/// Built fresh per request and handed to the persistence layer by
/// value; never mutated after handoff.
///
/// Invariants:
/// - `original_data_size == uncompressed_data.len()`
/// - if `is_gzipped`, `data` gzip-decodes to exactly `uncompressed_data`;
///   otherwise `data == uncompressed_data`
#[derive(Debug, Default, Clone)]
pub struct ParsedUpload {
    /// Base name only, no directory components; may be empty.
    pub file_name: String,
    /// Bytes as they will be stored; possibly gzipped.
    pub data: Bytes,
    /// Logical content; aliases `data` when not compressed.
    pub uncompressed_data: Bytes,
    /// Explicit, part-supplied, or sniffed. Empty when unknown; the
    /// generic octet-stream placeholder is never stored here.
    pub mime_type: String,
    /// Custom metadata headers under the reserved prefix.
    pub pair_map: HashMap<String, String>,
    pub is_gzipped: bool,
    /// Always equals `uncompressed_data.len()`.
    pub original_data_size: usize,
    /// Best-effort `ts` query parameter; 0 when absent or malformed.
    pub modified_time: u64,
    /// Best-effort `ttl` query parameter; None when absent or malformed.
    pub ttl: Option<Ttl>,
    /// True when the payload is a manifest referencing stored chunks
    /// rather than literal content.
    pub is_chunked_file: bool,
}
