//! On-disk artifact encoding.
//!
//! Every artifact file is a fixed little-endian header followed by a
//! bincode payload:
//!
//! | field          | type      |
//! |----------------|-----------|
//! | magic `PHSH`   | `[u8; 4]` |
//! | format version | `u16`     |
//! | kind           | `u8`      |
//! | payload crc32  | `u32`     |
//! | payload length | `u64`     |

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PhishError, Result};

pub const MAGIC: &[u8; 4] = b"PHSH";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 1 + 4 + 8;

/// Which half of the pair a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Vectorizer = 1,
    Classifier = 2,
}

impl ArtifactKind {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ArtifactKind::Vectorizer),
            2 => Some(ArtifactKind::Classifier),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Vectorizer => write!(f, "vectorizer"),
            ArtifactKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// Decoded fixed header of an artifact file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArtifactHeader {
    pub version: u16,
    pub kind: ArtifactKind,
    pub checksum: u32,
    pub payload_len: u64,
}

impl ArtifactHeader {
    /// Parse and validate the header at the start of `bytes`.
    ///
    /// Checks magic, version, kind and that the payload length matches
    /// the remaining bytes. The checksum is read but not verified.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!(
                "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            ));
        }
        if &bytes[..4] != MAGIC {
            return Err("bad magic number".to_string());
        }

        let mut cursor = Cursor::new(&bytes[4..HEADER_LEN]);
        let read_err = |e: std::io::Error| e.to_string();
        let version = cursor.read_u16::<LittleEndian>().map_err(read_err)?;
        let kind = cursor.read_u8().map_err(read_err)?;
        let checksum = cursor.read_u32::<LittleEndian>().map_err(read_err)?;
        let payload_len = cursor.read_u64::<LittleEndian>().map_err(read_err)?;

        if version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {version} (expected {FORMAT_VERSION})"
            ));
        }
        let kind = ArtifactKind::from_u8(kind).ok_or_else(|| format!("unknown kind {kind}"))?;
        let actual = (bytes.len() - HEADER_LEN) as u64;
        if payload_len != actual {
            return Err(format!(
                "payload length {payload_len} does not match the {actual} bytes present"
            ));
        }

        Ok(ArtifactHeader {
            version,
            kind,
            checksum,
            payload_len,
        })
    }
}

/// Serialize `value` into a complete artifact file image.
pub fn encode<T: Serialize>(kind: ArtifactKind, value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| PhishError::other(format!("failed to encode {kind} artifact: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    bytes.write_u8(kind as u8)?;
    bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Validate and deserialize an artifact file image.
///
/// Every failure is reported as `ArtifactCorrupt` naming `path`.
pub fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8], expected: ArtifactKind) -> Result<T> {
    let corrupt = |reason: String| PhishError::artifact_corrupt(path, reason);

    let header = ArtifactHeader::parse(bytes).map_err(corrupt)?;
    if header.kind != expected {
        return Err(corrupt(format!(
            "expected a {expected} artifact, found {}",
            header.kind
        )));
    }
    let payload = &bytes[HEADER_LEN..];
    if crc32fast::hash(payload) != header.checksum {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let (value, consumed) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| corrupt(format!("failed to decode payload: {e}")))?;
    if consumed != payload.len() {
        return Err(corrupt(format!(
            "{} trailing bytes after payload",
            payload.len() - consumed
        )));
    }
    Ok(value)
}
