//! Raw DEFLATE (RFC 1951) compression of tag payloads.
//!
//! Streams carry no zlib or gzip wrapper. Decompression enforces an output size
//! limit so a small hostile payload cannot expand into an unbounded allocation.

use crate::error::{Result, TagError};
use crate::utils::metrics::global_metrics;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compresses `data` as a raw DEFLATE stream at `level` (clamped to 0-9)
///
/// # Errors
/// Returns `TagError::CompressionFailure` if the encoder fails
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let metrics = global_metrics();
    metrics.compression_attempt();

    let mut encoder = DeflateEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(level.min(9)),
    );
    encoder
        .write_all(data)
        .map_err(|_| TagError::CompressionFailure)?;
    let out = encoder.finish().map_err(|_| TagError::CompressionFailure)?;

    metrics.compression_success();
    Ok(out)
}

/// Decompresses a raw DEFLATE stream, producing at most `max_output` bytes
///
/// # Errors
/// Returns `TagError::DecompressionFailure` if:
/// - The stream is corrupt or truncated
/// - Output size exceeds `max_output`
pub fn decompress(data: &[u8], max_output: usize) -> Result<Vec<u8>> {
    let mut reader = DeflateDecoder::new(data);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).min(max_output));

    // Read in chunks to enforce size limit
    let mut buffer = [0u8; 8192];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                out.extend_from_slice(&buffer[..n]);
                if out.len() > max_output {
                    return Err(TagError::DecompressionFailure);
                }
            }
            Err(_) => return Err(TagError::DecompressionFailure),
        }
    }
    Ok(out)
}
