//! Compression round-trip workload (zlib via flate2's pure-Rust backend).

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::WorkloadError;

/// Compress `input`, decompress the result, and require the exact original
/// byte sequence and length back. Returns the compressed size.
pub fn round_trip(input: &[u8]) -> Result<usize, WorkloadError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(input)?;
    let compressed = encoder.finish()?;

    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    let mut inflated = Vec::with_capacity(input.len());
    decoder.read_to_end(&mut inflated)?;

    if inflated != input {
        return Err(WorkloadError::InflateMismatch);
    }
    Ok(compressed.len())
}
