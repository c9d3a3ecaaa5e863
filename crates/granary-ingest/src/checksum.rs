//! Streaming payload checksum
//!
//! The payload is buffered exactly once: every chunk read off the wire
//! feeds an incremental MD5 on its way into the buffer, optionally
//! after passing through a streaming gzip decoder when the section
//! declared a compressed encoding.

use std::io::{self, Write};

use flate2::write::GzDecoder;
use md5::{Digest, Md5};

use granary_core::AppError;

/// Buffers bytes while hashing them.
pub(crate) struct ChecksumWriter {
    hasher: Md5,
    buf: Vec<u8>,
}

impl ChecksumWriter {
    fn new() -> ChecksumWriter {
        ChecksumWriter {
            hasher: Md5::new(),
            buf: Vec::new(),
        }
    }

    /// Final payload bytes and the lowercase hex digest.
    fn finish(self) -> (Vec<u8>, String) {
        (self.buf, hex::encode(self.hasher.finalize()))
    }
}

impl Write for ChecksumWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.hasher.update(data);
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where validated section bytes go: straight into the hashing buffer,
/// or through a gzip decoder first when the section declared
/// `Content-Encoding: gzip`.
pub(crate) enum SectionSink {
    Plain(ChecksumWriter),
    Gzip(GzDecoder<ChecksumWriter>),
}

impl SectionSink {
    pub(crate) fn new(gzipped: bool) -> SectionSink {
        if gzipped {
            SectionSink::Gzip(GzDecoder::new(ChecksumWriter::new()))
        } else {
            SectionSink::Plain(ChecksumWriter::new())
        }
    }

    pub(crate) fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        match self {
            SectionSink::Plain(w) => w.write_all(chunk).map_err(AppError::Io),
            SectionSink::Gzip(d) => d
                .write_all(chunk)
                .map_err(|e| AppError::InvalidGzip(e.to_string())),
        }
    }

    pub(crate) fn finish(self) -> Result<(Vec<u8>, String), AppError> {
        match self {
            SectionSink::Plain(w) => Ok(w.finish()),
            SectionSink::Gzip(d) => {
                let w = d.finish().map_err(|e| AppError::InvalidGzip(e.to_string()))?;
                Ok(w.finish())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granary_core::compression::gzip_data;

    #[test]
    fn plain_sink_hashes_what_it_buffers() {
        let mut sink = SectionSink::new(false);
        sink.write_chunk(b"hello ").unwrap();
        sink.write_chunk(b"world").unwrap();
        let (data, digest) = sink.finish().unwrap();
        assert_eq!(data, b"hello world");
        // md5("hello world")
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn gzip_sink_hashes_decoded_bytes() {
        let original = b"decode me before hashing".repeat(8);
        let compressed = gzip_data(&original).unwrap();

        let mut sink = SectionSink::new(true);
        for chunk in compressed.chunks(7) {
            sink.write_chunk(chunk).unwrap();
        }
        let (data, digest) = sink.finish().unwrap();
        assert_eq!(data, original);
        assert_eq!(digest, hex::encode(Md5::digest(&original)));
    }

    #[test]
    fn gzip_sink_rejects_non_gzip_input() {
        let mut sink = SectionSink::new(true);
        let err = sink
            .write_chunk(b"this is not a gzip stream at all")
            .and_then(|()| sink.finish().map(|_| ()))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGzip(_)));
        assert!(err
            .to_string()
            .starts_with("Content-Encoding == gzip but content was not gzipped:"));
    }
}
