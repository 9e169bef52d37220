use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH, IF_UNMODIFIED_SINCE, LAST_MODIFIED, RANGE};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{ByteRange, Preconditions, RangeResponse, RangeTransport};
use crate::error::{Result, ZipError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Range transport for remote ZIP files
pub struct HttpRangeTransport {
    client: Client,
    transferred_bytes: AtomicU64,
}

impl HttpRangeTransport {
    /// Create a transport with the default 30 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            transferred_bytes: AtomicU64::new(0),
        }
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

fn header_value(resp: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl RangeTransport for HttpRangeTransport {
    async fn fetch(
        &self,
        url: &str,
        range: ByteRange,
        conditions: &Preconditions,
    ) -> Result<RangeResponse> {
        let mut request = self.client.get(url).header(RANGE, range.to_string());
        if let Some(etag) = &conditions.if_match {
            request = request.header(IF_MATCH, etag);
        }
        if let Some(since) = &conditions.if_unmodified_since {
            request = request.header(IF_UNMODIFIED_SINCE, since);
        }

        let resp = request.send().await?;
        match resp.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::PRECONDITION_FAILED => return Err(ZipError::PreconditionFailed),
            status => return Err(ZipError::Status(status.as_u16())),
        }

        let etag = header_value(&resp, ETAG);
        let last_modified = header_value(&resp, LAST_MODIFIED);
        let data = resp.bytes().await?.to_vec();

        self.transferred_bytes
            .fetch_add(data.len() as u64, Ordering::Relaxed);
        debug!(%range, received = data.len(), ?etag, "range response");

        Ok(RangeResponse {
            data,
            etag,
            last_modified,
        })
    }
}
