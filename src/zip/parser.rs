//! Low-level ZIP record parsing.
//!
//! Everything here works on byte buffers that were already fetched; the
//! decisions about *which* bytes to fetch live in [`RemoteZip`](super::RemoteZip).
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) in the file's tail
//! 2. Read the Central Directory to get metadata for all files
//! 3. For extraction, read each file's Local File Header and data
//!
//! This keeps the number of Range requests small: one for the tail, one for
//! the Central Directory and one per extracted entry.

use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::debug;

use super::bytes::{read_u16, read_u32};
use super::structures::*;
use crate::error::{Result, ZipError};

/// Default number of trailing comment bytes searched for the EOCD.
///
/// Archives whose comment is longer than this are not supported.
pub const DEFAULT_COMMENT_SEARCH: usize = 16;

/// Number of bytes to step back after a failed signature match, keyed on the
/// first byte of the rejected window. A window whose first byte equals the
/// n-th signature byte can only be preceded by a match n bytes earlier.
fn skip_for(first: u8) -> usize {
    match first {
        0x4b => 1,
        0x05 => 2,
        0x06 => 3,
        _ => 4,
    }
}

/// Find and parse the End of Central Directory record in the file's tail.
///
/// `tail` holds the last bytes of the resource (at most
/// `EOCD::SIZE + comment_search` of them). Candidate windows start at
/// `-22` from the end and move backward until `-22 - comment_search`.
pub fn locate_eocd(tail: &[u8], comment_search: usize) -> Result<EndOfCentralDirectory> {
    let limit = EndOfCentralDirectory::SIZE + comment_search;
    let mut back = EndOfCentralDirectory::SIZE;

    while back <= limit && back <= tail.len() {
        let start = tail.len() - back;
        let window = &tail[start..start + EndOfCentralDirectory::SIZE];

        if window[0..4] == EndOfCentralDirectory::SIGNATURE {
            let eocd = EndOfCentralDirectory::from_bytes(window)?;
            debug!(
                from_end = back,
                entries = eocd.total_entries,
                cd_size = eocd.cd_size,
                cd_offset = eocd.cd_offset,
                "found End of Central Directory"
            );
            return Ok(eocd);
        }

        back += skip_for(window[0]);
    }

    Err(ZipError::EocdNotFound)
}

/// Parse a complete Central Directory buffer into its entries.
///
/// The walk must land exactly on the end of `data`; a record that crosses
/// the end is reported as truncation.
pub fn parse_central_directory(data: &[u8]) -> Result<Vec<ZipFileEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let (entry, record_len) = parse_cdfh(&data[pos..], pos)?;
        entries.push(entry);
        pos += record_len;
    }

    Ok(entries)
}

/// Parse one Central Directory File Header located at `at` within the
/// directory. Returns the entry and the record's total length.
fn parse_cdfh(record: &[u8], at: usize) -> Result<(ZipFileEntry, usize)> {
    if record.get(0..4) != Some(&CDFH_SIGNATURE[..]) {
        return Err(ZipError::InvalidCentralDirectory(at));
    }
    if record.len() < CDFH_MIN_SIZE {
        return Err(ZipError::TruncatedCentralDirectory(format!(
            "record at offset {at} has {} of {CDFH_MIN_SIZE} fixed bytes",
            record.len()
        )));
    }

    let flags = read_u16(record, 8)?;
    let compression_method = read_u16(record, 10)?;
    let last_mod_time = read_u16(record, 12)?;
    let last_mod_date = read_u16(record, 14)?;
    let crc32 = read_u32(record, 16)?;
    let compressed_size = read_u32(record, 20)?;
    let uncompressed_size = read_u32(record, 24)?;
    let file_name_length = read_u16(record, 28)? as usize;
    let extra_field_length = read_u16(record, 30)? as usize;
    let file_comment_length = read_u16(record, 32)? as usize;
    let lfh_offset = read_u32(record, 42)?;

    let record_len = CDFH_MIN_SIZE + file_name_length + extra_field_length + file_comment_length;
    if record_len > record.len() {
        return Err(ZipError::TruncatedCentralDirectory(format!(
            "record at offset {at} needs {record_len} bytes, {} left",
            record.len()
        )));
    }

    let file_name = decode_name(
        &record[CDFH_MIN_SIZE..CDFH_MIN_SIZE + file_name_length],
        flags,
    );
    let is_directory = file_name.ends_with('/');

    let entry = ZipFileEntry {
        file_name,
        flags,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size: compressed_size as u64,
        uncompressed_size: uncompressed_size as u64,
        crc32,
        lfh_offset: lfh_offset as u64,
        last_mod_time,
        last_mod_date,
        is_directory,
    };

    Ok((entry, record_len))
}

/// Decode an entry name: UTF-8 when the language-encoding flag is set,
/// otherwise a single-byte ASCII-compatible code page.
fn decode_name(raw: &[u8], flags: u16) -> String {
    let encoding = if flags & FLAG_UTF8 != 0 {
        UTF_8
    } else {
        WINDOWS_1252
    };
    encoding.decode_without_bom_handling(raw).0.into_owned()
}

/// Offset at which the payload begins inside a fetched Local File Header
/// range, validating the header signature first. The name and extra field
/// must fit inside `header`.
pub fn local_data_start(header: &[u8], entry_name: &str) -> Result<usize> {
    if header.get(0..4) != Some(&LFH_SIGNATURE[..]) || header.len() < LFH_SIZE {
        return Err(ZipError::InvalidLocalHeader(entry_name.to_string()));
    }

    let file_name_length = read_u16(header, 26)? as usize;
    let extra_field_length = read_u16(header, 28)? as usize;

    let start = LFH_SIZE + file_name_length + extra_field_length;
    if start > header.len() {
        return Err(ZipError::InvalidLocalHeader(entry_name.to_string()));
    }
    Ok(start)
}
