mod http;
mod local;

pub use http::HttpRangeTransport;
pub use local::LocalFileTransport;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

/// A byte range in HTTP `Range` header terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Bytes `start..=end`.
    Span { start: u64, end: u64 },
    /// The last `n` bytes of the resource.
    Suffix(u64),
}

impl ByteRange {
    /// Half-open `[start, end)` range; `None` when it is empty.
    pub fn between(start: u64, end: u64) -> Option<Self> {
        (end > start).then(|| ByteRange::Span {
            start,
            end: end - 1,
        })
    }

    /// Resolve against a resource of `size` bytes, clamping like a server
    /// would. Returns `None` for unsatisfiable ranges.
    pub fn resolve(&self, size: u64) -> Option<std::ops::Range<u64>> {
        match *self {
            ByteRange::Span { start, end } if start < size && start <= end => {
                Some(start..end.saturating_add(1).min(size))
            }
            ByteRange::Span { .. } => None,
            ByteRange::Suffix(0) => None,
            ByteRange::Suffix(n) => Some(size.saturating_sub(n)..size),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteRange::Span { start, end } => write!(f, "bytes={start}-{end}"),
            ByteRange::Suffix(n) => write!(f, "bytes=-{n}"),
        }
    }
}

/// Conditions attached to a range request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preconditions {
    /// Sent as `If-Match`.
    pub if_match: Option<String>,
    /// Sent as `If-Unmodified-Since`.
    pub if_unmodified_since: Option<String>,
}

/// Body and validators of a successful (206) range response.
#[derive(Debug, Clone, Default)]
pub struct RangeResponse {
    pub data: Vec<u8>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Random access to a remote resource through byte-range requests.
///
/// Implementations answer with exactly the requested bytes (clamped to the
/// resource size) and the resource's current validators. A failed
/// precondition must be reported as
/// [`ZipError::PreconditionFailed`](crate::ZipError::PreconditionFailed) and
/// any other non-partial response as [`ZipError::Status`](crate::ZipError::Status).
#[async_trait]
pub trait RangeTransport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        range: ByteRange,
        conditions: &Preconditions,
    ) -> Result<RangeResponse>;
}

#[async_trait]
impl<T: RangeTransport + ?Sized> RangeTransport for std::sync::Arc<T> {
    async fn fetch(
        &self,
        url: &str,
        range: ByteRange,
        conditions: &Preconditions,
    ) -> Result<RangeResponse> {
        (**self).fetch(url, range, conditions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_values() {
        assert_eq!(ByteRange::Span { start: 0, end: 9 }.to_string(), "bytes=0-9");
        assert_eq!(ByteRange::Suffix(38).to_string(), "bytes=-38");
        assert_eq!(
            ByteRange::between(100, 150),
            Some(ByteRange::Span { start: 100, end: 149 })
        );
        assert_eq!(ByteRange::between(5, 5), None);
    }

    #[test]
    fn resolves_like_a_server() {
        assert_eq!(ByteRange::Suffix(38).resolve(100), Some(62..100));
        assert_eq!(ByteRange::Suffix(38).resolve(10), Some(0..10));
        assert_eq!(ByteRange::Span { start: 90, end: 200 }.resolve(100), Some(90..100));
        assert_eq!(ByteRange::Span { start: 100, end: 200 }.resolve(100), None);
        assert_eq!(ByteRange::Suffix(0).resolve(100), None);
    }
}
