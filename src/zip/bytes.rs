//! Bounds-checked little-endian field access for ZIP records.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, ZipError};

fn field(buf: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(ZipError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        })
}

/// Read a little-endian `u16` at `offset`.
pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(LittleEndian::read_u16(field(buf, offset, 2)?))
}

/// Read a little-endian `u32` at `offset`.
pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(field(buf, offset, 4)?))
}
