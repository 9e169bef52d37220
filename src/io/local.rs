use async_trait::async_trait;
use std::io::{Read, Seek, SeekFrom};
use std::time::UNIX_EPOCH;

use super::{ByteRange, Preconditions, RangeResponse, RangeTransport};
use crate::error::{Result, ZipError};

/// Range transport over the local filesystem.
///
/// The "URL" is a file path. Validators are derived from the file's length
/// and modification time, so rewriting the file between two fetches is
/// reported as a failed precondition just like an HTTP server would.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileTransport;

impl LocalFileTransport {
    pub fn new() -> Self {
        Self
    }
}

fn validators(metadata: &std::fs::Metadata) -> (String, String) {
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .unwrap_or_default();
    let etag = format!("\"{:x}-{:x}\"", metadata.len(), modified.as_nanos());
    (etag, modified.as_secs().to_string())
}

fn read_range(path: &str, range: ByteRange, conditions: &Preconditions) -> Result<RangeResponse> {
    let mut file = std::fs::File::open(path)?;
    let metadata = file.metadata()?;
    let (etag, last_modified) = validators(&metadata);

    let stale_tag = conditions.if_match.as_ref().is_some_and(|t| *t != etag);
    let stale_time = conditions
        .if_unmodified_since
        .as_ref()
        .is_some_and(|t| *t != last_modified);
    if stale_tag || stale_time {
        return Err(ZipError::PreconditionFailed);
    }

    // 416 Range Not Satisfiable
    let span = range.resolve(metadata.len()).ok_or(ZipError::Status(416))?;

    let mut data = Vec::with_capacity((span.end - span.start) as usize);
    file.seek(SeekFrom::Start(span.start))?;
    file.take(span.end - span.start).read_to_end(&mut data)?;

    Ok(RangeResponse {
        data,
        etag: Some(etag),
        last_modified: Some(last_modified),
    })
}

#[async_trait]
impl RangeTransport for LocalFileTransport {
    async fn fetch(
        &self,
        url: &str,
        range: ByteRange,
        conditions: &Preconditions,
    ) -> Result<RangeResponse> {
        let path = url.to_string();
        let conditions = conditions.clone();
        tokio::task::spawn_blocking(move || read_range(&path, range, &conditions))
            .await
            .map_err(|e| ZipError::Io(std::io::Error::other(e)))?
    }
}
