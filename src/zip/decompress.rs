//! Payload decompression for the methods this reader understands.

use flate2::{Decompress, FlushDecompress, Status};

use super::structures::CompressionMethod;
use crate::error::{Result, ZipError};

/// Decompress an entry payload according to its compression method.
///
/// `size_hint` is the expected output length and only sizes the initial
/// allocation. Methods other than STORED and DEFLATE are rejected.
pub fn decompress(data: &[u8], method: CompressionMethod, size_hint: usize) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Stored => Ok(data.to_vec()),
        CompressionMethod::Deflate => inflate_raw(data, size_hint),
        CompressionMethod::Unknown(code) => Err(ZipError::UnsupportedCompression(code)),
    }
}

/// Inflate a raw DEFLATE stream (no zlib header or trailer).
///
/// The stream must reach its final block; input that runs out first is
/// reported as truncated instead of returning short output.
fn inflate_raw(data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(size_hint.max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }

        let consumed = inflater.total_in();
        let produced = inflater.total_out();
        let input = data.get(consumed as usize..).unwrap_or_default();

        let status = inflater
            .decompress_vec(input, &mut out, FlushDecompress::None)
            .map_err(|e| ZipError::Decompress(e.to_string()))?;

        if status == Status::StreamEnd {
            return Ok(out);
        }

        // Output space is available, so no progress means the input ran dry.
        if inflater.total_in() == consumed && inflater.total_out() == produced {
            return Err(ZipError::Decompress(format!(
                "stream truncated after {} of {} input bytes",
                consumed,
                data.len()
            )));
        }
    }
}
