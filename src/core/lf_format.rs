//! LyraFrame project container codec (`.lf`).
//!
//! Layout:
//! - `[0..4]` magic `LYRA`
//! - `[4]` format version
//! - `[5]` flags (reserved, written as 0)
//! - `[6..]` compressed UTF-8 JSON document
//!
//! The encoder writes a zlib stream. The decoder also accepts gzip, which is
//! what older desktop builds wrote.

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FormatError, FormatResult};

/// Magic header "LYRA"
pub const MAGIC_HEADER: [u8; 4] = [0x4C, 0x59, 0x52, 0x41];
pub const FORMAT_VERSION: u8 = 1;
/// Magic + version + flags.
pub const HEADER_LEN: usize = 6;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fixed-size container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfHeader {
    pub version: u8,
    pub flags: u8,
}

/// Check whether a buffer starts with a `.lf` header.
pub fn is_valid_lf_file(buffer: &[u8]) -> bool {
    buffer.len() >= HEADER_LEN && buffer[..4] == MAGIC_HEADER
}

/// Validate and read the container header.
///
/// Versions up to [`FORMAT_VERSION`] are accepted (version 0 predates the
/// versioned schema and is decoded best effort); newer ones are rejected.
pub fn read_header(buffer: &[u8]) -> FormatResult<LfHeader> {
    if buffer.len() < HEADER_LEN {
        return Err(FormatError::TooShort { len: buffer.len() });
    }
    if buffer[..4] != MAGIC_HEADER {
        return Err(FormatError::BadMagic);
    }

    let header = LfHeader {
        version: buffer[4],
        flags: buffer[5],
    };
    if header.version > FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            version: header.version,
        });
    }
    if header.flags != 0 {
        warn!(flags = header.flags, "Ignoring reserved .lf flags");
    }
    Ok(header)
}

/// Serialize `data` to JSON and wrap it in a `.lf` container.
pub fn encode_lf_format<T: Serialize + ?Sized>(data: &T) -> FormatResult<Vec<u8>> {
    let json = serde_json::to_vec(data)?;
    encode_lf_bytes(&json)
}

/// Wrap an already serialized JSON string in a `.lf` container.
pub fn encode_lf_json(json: &str) -> FormatResult<Vec<u8>> {
    encode_lf_bytes(json.as_bytes())
}

fn encode_lf_bytes(json: &[u8]) -> FormatResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json).map_err(FormatError::Compress)?;
    let compressed = encoder.finish().map_err(FormatError::Compress)?;

    let mut result = Vec::with_capacity(HEADER_LEN + compressed.len());
    result.extend_from_slice(&MAGIC_HEADER);
    result.push(FORMAT_VERSION);
    result.push(0);
    result.extend_from_slice(&compressed);

    debug!(
        json_len = json.len(),
        encoded_len = result.len(),
        "Encoded .lf container"
    );
    Ok(result)
}

/// Decode a `.lf` container to its JSON document.
pub fn decode_lf_format(buffer: &[u8]) -> FormatResult<serde_json::Value> {
    decode_lf_payload(buffer).map(|(_, value)| value)
}

/// Decode a `.lf` container, also returning its header so callers can migrate
/// by version.
pub fn decode_lf_payload(buffer: &[u8]) -> FormatResult<(LfHeader, serde_json::Value)> {
    let (header, json) = decode_lf_inner(buffer)?;
    let value = serde_json::from_str(&json)?;
    Ok((header, value))
}

/// Decode a `.lf` container to the raw JSON text without parsing it.
pub fn decode_lf_to_string(buffer: &[u8]) -> FormatResult<String> {
    decode_lf_inner(buffer).map(|(_, json)| json)
}

fn decode_lf_inner(buffer: &[u8]) -> FormatResult<(LfHeader, String)> {
    let header = read_header(buffer)?;
    let compressed = &buffer[HEADER_LEN..];

    let mut decompressed = Vec::new();
    if compressed.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(compressed).read_to_end(&mut decompressed)
    } else {
        ZlibDecoder::new(compressed).read_to_end(&mut decompressed)
    }
    .map_err(FormatError::Decompress)?;

    let json = String::from_utf8(decompressed)?;
    debug!(
        version = header.version,
        json_len = json.len(),
        "Decoded .lf container"
    );
    Ok((header, json))
}
