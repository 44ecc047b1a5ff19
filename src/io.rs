//! Loading CIF text from disk.
//!
//! The parser works on a borrowed `&str`, so callers own the buffer. This
//! module reads a file into a `String`, transparently decompressing gzip
//! input (detected by its magic bytes, not the file name) when the `gzip`
//! feature is enabled.

use std::path::{Path, PathBuf};

/// The two leading bytes of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while loading a text buffer
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The gzip stream could not be decompressed
    #[error("Failed to decompress {}: {source}", .path.display())]
    Decompress {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The input is gzip-compressed but gzip support is not compiled in
    #[error("{} is gzip-compressed; rebuild with the `gzip` feature", .path.display())]
    GzipUnsupported {
        /// File that was being read
        path: PathBuf,
    },

    /// The decoded content is not UTF-8
    #[error("{} is not valid UTF-8 (byte {valid_up_to})", .path.display())]
    InvalidUtf8 {
        /// File that was being read
        path: PathBuf,
        /// Length of the valid prefix
        valid_up_to: usize,
    },
}

/// Returns `true` if `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

#[cfg(feature = "gzip")]
fn gunzip(bytes: &[u8], path: &Path) -> Result<Vec<u8>, LoadError> {
    use std::io::Read;

    let mut decoder = flate2::read::MultiGzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|source| LoadError::Decompress {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(decompressed)
}

#[cfg(not(feature = "gzip"))]
fn gunzip(_bytes: &[u8], path: &Path) -> Result<Vec<u8>, LoadError> {
    Err(LoadError::GzipUnsupported {
        path: path.to_path_buf(),
    })
}

/// Decode raw file content, gunzipping it first if needed.
pub fn decode_text(bytes: Vec<u8>, path: &Path) -> Result<String, LoadError> {
    let bytes = if is_gzip(&bytes) {
        let decompressed = gunzip(&bytes, path)?;
        log::debug!(
            "Decompressed {} ({} -> {} bytes)",
            path.display(),
            bytes.len(),
            decompressed.len()
        );
        decompressed
    } else {
        bytes
    };

    String::from_utf8(bytes).map_err(|e| LoadError::InvalidUtf8 {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Read a file into a string, gunzipping it if it is compressed.
pub fn read_text(path: impl AsRef<Path>) -> Result<String, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_text(bytes, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let text = decode_text(b"data_x\n_a.b 1\n".to_vec(), Path::new("x.cif")).unwrap();
        assert_eq!(text, "data_x\n_a.b 1\n");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode_text(vec![b'd', b'a', 0xff], Path::new("bad.cif")).unwrap_err();
        assert!(matches!(err, LoadError::InvalidUtf8 { valid_up_to: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_text("/nonexistent/ciftext/missing.cif").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing.cif"));
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_gzip_detected_by_content() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"data_gz\n_a.b 2\n").unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(is_gzip(&compressed));

        // The name does not matter, only the magic bytes.
        let text = decode_text(compressed, Path::new("plain.cif")).unwrap();
        assert_eq!(text, "data_gz\n_a.b 2\n");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_truncated_gzip() {
        let err = decode_text(vec![0x1f, 0x8b, 0x08], Path::new("cut.cif.gz")).unwrap_err();
        assert!(matches!(err, LoadError::Decompress { .. }));
    }
}
