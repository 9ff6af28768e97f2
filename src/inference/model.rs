//! GGUF model file validation
//!
//! Reads just enough of a model file to reject obviously wrong inputs before
//! llama.cpp gets to see them. llama.cpp aborts the process on some malformed
//! files, so this check runs first.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

/// "GGUF" read as a little-endian u32
pub const GGUF_MAGIC: u32 = 0x4655_4747;

/// GGUF container versions llama.cpp can still read
pub const SUPPORTED_GGUF_VERSIONS: [u32; 2] = [2, 3];

/// Errors raised while inspecting a model file
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("model path is not a file: {0}")]
    NotAFile(String),

    #[error("failed to read model file: {0}")]
    Io(#[from] io::Error),

    #[error("not a GGUF file (magic {0:#010x})")]
    InvalidMagic(u32),

    #[error("unsupported GGUF version {0}")]
    UnsupportedVersion(u32),

    #[error("GGUF header is truncated")]
    Truncated,
}

/// Fixed-size header at the start of every GGUF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GgufHeader {
    pub version: u32,
    pub tensor_count: u64,
    pub metadata_kv_count: u64,
}

/// Checks that `path` is a readable GGUF file and returns its header
pub fn validate_gguf<P: AsRef<Path>>(path: P) -> Result<GgufHeader, ModelError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ModelError::NotFound(display));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(ModelError::NotAFile(display));
    }

    let mut header = [0u8; 24];
    let read = read_up_to(&mut File::open(path)?, &mut header)?;
    parse_header(&header[..read])
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn parse_header(bytes: &[u8]) -> Result<GgufHeader, ModelError> {
    let magic = le_u32(bytes, 0).ok_or(ModelError::Truncated)?;
    if magic != GGUF_MAGIC {
        return Err(ModelError::InvalidMagic(magic));
    }

    let version = le_u32(bytes, 4).ok_or(ModelError::Truncated)?;
    if !SUPPORTED_GGUF_VERSIONS.contains(&version) {
        return Err(ModelError::UnsupportedVersion(version));
    }

    Ok(GgufHeader {
        version,
        tensor_count: le_u64(bytes, 8).ok_or(ModelError::Truncated)?,
        metadata_kv_count: le_u64(bytes, 16).ok_or(ModelError::Truncated)?,
    })
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}

fn le_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let slice = bytes.get(at..at + 8)?;
    Some(u64::from_le_bytes(slice.try_into().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn header_bytes(magic: u32, version: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&magic.to_le_bytes());
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes.extend_from_slice(&291u64.to_le_bytes());
        bytes.extend_from_slice(&24u64.to_le_bytes());
        bytes
    }

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_valid_header() {
        let file = write_temp(&header_bytes(GGUF_MAGIC, 3));
        let header = validate_gguf(file.path()).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.tensor_count, 291);
        assert_eq!(header.metadata_kv_count, 24);
    }

    #[test]
    fn test_missing_file() {
        let err = validate_gguf("nonexistent.gguf").unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
        assert!(err.to_string().contains("nonexistent.gguf"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_gguf(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::NotAFile(_)));
    }

    #[test]
    fn test_wrong_magic() {
        let file = write_temp(b"PK\x03\x04 definitely a zip archive");
        let err = validate_gguf(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidMagic(_)));
    }

    #[test]
    fn test_old_version_rejected() {
        let file = write_temp(&header_bytes(GGUF_MAGIC, 1));
        let err = validate_gguf(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedVersion(1)));
    }

    #[test]
    fn test_truncated_header() {
        let file = write_temp(&header_bytes(GGUF_MAGIC, 3)[..12]);
        let err = validate_gguf(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::Truncated));

        let empty = write_temp(&[]);
        assert!(matches!(
            validate_gguf(empty.path()).unwrap_err(),
            ModelError::Truncated
        ));
    }
}
