//! Shared fixtures: an in-memory ZIP builder and a scripted range transport.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::DeflateEncoder;

use rangezip::{ByteRange, Preconditions, RangeResponse, RangeTransport, Result, ZipError};

pub const GPL_NOTICE: &str = "This program is free software: you can redistribute it and/or modify\n\
it under the terms of the GNU General Public License as published by\n\
the Free Software Foundation, either version 3 of the License, or\n\
(at your option) any later version.\n";

/// Assembles ZIP archives byte by byte so tests control every field.
#[derive(Default)]
pub struct ArchiveBuilder {
    data: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, content: &[u8]) -> Self {
        self.raw(name, 0, content, content.len() as u32)
    }

    pub fn deflated(self, name: &str, content: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(content).unwrap();
        let packed = encoder.finish().unwrap();
        self.raw(name, 8, &packed, content.len() as u32)
    }

    pub fn directory(self, name: &str) -> Self {
        self.raw(name, 0, b"", 0)
    }

    /// Add an entry with an arbitrary method and an already encoded payload.
    pub fn raw(mut self, name: &str, method: u16, payload: &[u8], uncompressed: u32) -> Self {
        let flags: u16 = if name.is_ascii() { 0 } else { 0x0800 };
        let offset = self.data.len() as u32;
        // Local extra field differs from the central one on purpose.
        let local_extra = [0x55, 0x54, 0x01, 0x00, 0x00];

        let local = &mut self.data;
        local.extend_from_slice(b"PK\x03\x04");
        local.extend_from_slice(&20u16.to_le_bytes());
        local.extend_from_slice(&flags.to_le_bytes());
        local.extend_from_slice(&method.to_le_bytes());
        local.extend_from_slice(&0x6000u16.to_le_bytes());
        local.extend_from_slice(&0x5a21u16.to_le_bytes());
        local.extend_from_slice(&0u32.to_le_bytes());
        local.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        local.extend_from_slice(&uncompressed.to_le_bytes());
        local.extend_from_slice(&(name.len() as u16).to_le_bytes());
        local.extend_from_slice(&(local_extra.len() as u16).to_le_bytes());
        local.extend_from_slice(name.as_bytes());
        local.extend_from_slice(&local_extra);
        local.extend_from_slice(payload);

        let central = &mut self.central;
        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&0x031eu16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&flags.to_le_bytes());
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&0x6000u16.to_le_bytes());
        central.extend_from_slice(&0x5a21u16.to_le_bytes());
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        central.extend_from_slice(&uncompressed.to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&[0; 8]);
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut archive = self.data;
        let cd_offset = archive.len() as u32;
        archive.extend_from_slice(&self.central);

        archive.extend_from_slice(b"PK\x05\x06");
        archive.extend_from_slice(&[0; 4]);
        archive.extend_from_slice(&self.count.to_le_bytes());
        archive.extend_from_slice(&self.count.to_le_bytes());
        archive.extend_from_slice(&(self.central.len() as u32).to_le_bytes());
        archive.extend_from_slice(&cd_offset.to_le_bytes());
        archive.extend_from_slice(&0u16.to_le_bytes());
        archive
    }
}

/// Three files and one directory, as most tests use it.
pub fn sample_archive() -> Vec<u8> {
    ArchiveBuilder::new()
        .deflated("LICENSE", GPL_NOTICE.repeat(20).as_bytes())
        .directory("src/")
        .stored("src/main.rs", b"fn main() {}\n")
        .deflated("README.md", b"# sample\n\nA small archive used by the tests.\n")
        .finish()
}

/// Central Directory offset and size declared by the archive's EOCD.
pub fn central_directory(archive: &[u8]) -> (usize, usize) {
    let eocd = &archive[archive.len() - 22..];
    let size = u32::from_le_bytes(eocd[12..16].try_into().unwrap()) as usize;
    let offset = u32::from_le_bytes(eocd[16..20].try_into().unwrap()) as usize;
    (offset, size)
}

/// Absolute offset of the `index`-th Central Directory record.
pub fn central_record(archive: &[u8], index: usize) -> usize {
    let (mut pos, _) = central_directory(archive);
    for _ in 0..index {
        let name = u16::from_le_bytes([archive[pos + 28], archive[pos + 29]]) as usize;
        let extra = u16::from_le_bytes([archive[pos + 30], archive[pos + 31]]) as usize;
        let comment = u16::from_le_bytes([archive[pos + 32], archive[pos + 33]]) as usize;
        pos += 46 + name + extra + comment;
    }
    pos
}

/// Local File Header offset recorded in the `index`-th Central Directory record.
pub fn local_header(archive: &[u8], index: usize) -> usize {
    let record = central_record(archive, index);
    u32::from_le_bytes(archive[record + 42..record + 46].try_into().unwrap()) as usize
}

pub fn set_u32(archive: &mut [u8], at: usize, value: u32) {
    archive[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

type Schedule = Box<dyn Fn(usize) -> (String, usize) + Send + Sync>;

/// One request as the transport saw it.
#[derive(Debug, Clone)]
pub struct Request {
    pub range: ByteRange,
    pub conditions: Preconditions,
}

/// In-memory server for one URL.
///
/// The schedule maps the index of each incoming request to the validator and
/// the content version the resource has at that moment, which lets a test
/// replace the archive between any two requests.
pub struct MockTransport {
    versions: Vec<Vec<u8>>,
    schedule: Schedule,
    etags: bool,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// A resource that never changes.
    pub fn new(archive: Vec<u8>) -> Self {
        Self::scheduled(vec![archive], |_| ("\"v0\"".to_string(), 0))
    }

    pub fn scheduled(
        versions: Vec<Vec<u8>>,
        schedule: impl Fn(usize) -> (String, usize) + Send + Sync + 'static,
    ) -> Self {
        Self {
            versions,
            schedule: Box::new(schedule),
            etags: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Only send `Last-Modified`, never `ETag`.
    pub fn without_etags(mut self) -> Self {
        self.etags = false;
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RangeTransport for MockTransport {
    async fn fetch(
        &self,
        _url: &str,
        range: ByteRange,
        conditions: &Preconditions,
    ) -> Result<RangeResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(Request {
                range,
                conditions: conditions.clone(),
            });
            requests.len() - 1
        };

        let (validator, version) = (self.schedule)(index);
        let data = &self.versions[version];

        let (etag, last_modified) = if self.etags {
            (Some(validator), Some("Thu, 01 Jan 2026 00:00:00 GMT".to_string()))
        } else {
            (None, Some(validator))
        };

        let stale_tag = match (&conditions.if_match, &etag) {
            (Some(expected), Some(current)) => expected != current,
            (Some(_), None) => true,
            _ => false,
        };
        let stale_time = conditions
            .if_unmodified_since
            .as_ref()
            .is_some_and(|since| Some(since) != last_modified.as_ref());
        if stale_tag || stale_time {
            return Err(ZipError::PreconditionFailed);
        }

        let span = range
            .resolve(data.len() as u64)
            .ok_or(ZipError::Status(416))?;

        Ok(RangeResponse {
            data: data[span.start as usize..span.end as usize].to_vec(),
            etag,
            last_modified,
        })
    }
}
