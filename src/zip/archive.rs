//! The remote archive handle.
//!
//! [`RemoteZip`] ties the parser to a [`RangeTransport`]: it fetches the
//! archive tail and Central Directory on [`open`](RemoteZip::open) and one
//! byte range per extracted entry. All fetches are pinned to the version of
//! the resource observed first; see [`consistency`](super::consistency).

use tracing::{debug, warn};

use super::consistency::{ConsistencyState, DEFAULT_MAX_ATTEMPTS};
use super::decompress::decompress;
use super::parser::{
    DEFAULT_COMMENT_SEARCH, local_data_start, locate_eocd, parse_central_directory,
};
use super::structures::{CentralDirectory, EndOfCentralDirectory, ZipFileEntry};
use crate::error::{Result, ZipError};
use crate::io::{ByteRange, RangeTransport};
use crate::text::{DEFAULT_ENCODING, decode_text};

/// Upper bound for the output buffer reserved ahead of decompression.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Tunables for a [`RemoteZip`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Total attempts an extraction gets when the remote archive keeps
    /// changing underneath it.
    pub max_attempts: u32,
    /// Trailing comment bytes searched for the End of Central Directory.
    pub comment_search: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            comment_search: DEFAULT_COMMENT_SEARCH,
        }
    }
}

/// A ZIP archive read through byte-range requests.
///
/// Methods that talk to the transport take `&mut self`: a reload after a
/// detected modification replaces handle-wide state. Wrap the handle in a
/// `tokio::sync::Mutex` to share it between tasks.
///
/// ## Example
///
/// ```no_run
/// use rangezip::{HttpRangeTransport, RemoteZip};
///
/// # async fn run() -> rangezip::Result<()> {
/// let transport = HttpRangeTransport::new()?;
/// let mut archive = RemoteZip::new("https://example.com/archive.zip", transport);
/// archive.open().await?;
///
/// for name in archive.files()? {
///     println!("{name}");
/// }
/// let license = archive.extract_text_file("LICENSE", None).await?;
/// # Ok(())
/// # }
/// ```
pub struct RemoteZip<T: RangeTransport> {
    url: String,
    transport: T,
    options: ArchiveOptions,
    state: ConsistencyState,
    directory: Option<CentralDirectory>,
}

impl<T: RangeTransport> RemoteZip<T> {
    pub fn new(url: impl Into<String>, transport: T) -> Self {
        Self::with_options(url, transport, ArchiveOptions::default())
    }

    pub fn with_options(url: impl Into<String>, transport: T, options: ArchiveOptions) -> Self {
        Self {
            url: url.into(),
            transport,
            options,
            state: ConsistencyState::default(),
            directory: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Validators of the resource version the handle is currently pinned to.
    pub fn consistency(&self) -> &ConsistencyState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.directory.is_some()
    }

    /// Locate the End of Central Directory and load the Central Directory.
    ///
    /// Any previously pinned version is dropped first, so re-opening picks
    /// up whatever the server currently holds.
    pub async fn open(&mut self) -> Result<()> {
        self.invalidate();
        let directory = self.load_directory().await?;
        self.directory = Some(directory);
        Ok(())
    }

    /// Forget the parsed directory and the pinned version.
    ///
    /// No connection is held between calls, so there is nothing else to
    /// release. The handle can be opened again afterwards.
    pub fn close(&mut self) {
        self.invalidate();
    }

    /// All Central Directory entries in directory order, directories included.
    pub fn entries(&self) -> Result<&[ZipFileEntry]> {
        self.directory
            .as_ref()
            .map(|d| d.entries.as_slice())
            .ok_or(ZipError::NotOpened)
    }

    /// Names of the file entries in directory order, directories excluded.
    pub fn files(&self) -> Result<Vec<&str>> {
        Ok(self
            .entries()?
            .iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.file_name.as_str())
            .collect())
    }

    /// Extract an entry's decompressed content.
    ///
    /// If the archive changes on the server mid-way, the directory is
    /// reloaded and the extraction retried, up to
    /// [`ArchiveOptions::max_attempts`] attempts in total.
    pub async fn extract_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut attempt = 1;
        let mut outcome = self.retrieve(name).await;

        loop {
            match outcome {
                Err(ZipError::PreconditionFailed) if attempt < self.options.max_attempts => {
                    attempt += 1;
                    warn!(
                        url = %self.url,
                        entry = name,
                        attempt,
                        "remote archive changed, reloading Central Directory"
                    );
                    self.invalidate();
                    outcome = match self.load_directory().await {
                        Ok(directory) => {
                            self.directory = Some(directory);
                            self.retrieve(name).await
                        }
                        Err(e) => Err(e),
                    };
                }
                Err(ZipError::PreconditionFailed) => {
                    self.invalidate();
                    return outcome;
                }
                _ => return outcome,
            }
        }
    }

    /// Extract an entry and decode it as text. `encoding` is a WHATWG label
    /// and defaults to UTF-8.
    pub async fn extract_text_file(&mut self, name: &str, encoding: Option<&str>) -> Result<String> {
        let data = self.extract_file(name).await?;
        decode_text(&data, encoding.unwrap_or(DEFAULT_ENCODING), name)
    }

    fn invalidate(&mut self) {
        self.state.clear();
        self.directory = None;
    }

    /// Fetch one range pinned to the current version, then pin to whatever
    /// version answered.
    async fn fetch(&mut self, range: ByteRange) -> Result<Vec<u8>> {
        let conditions = self.state.preconditions();
        debug!(
            url = %self.url,
            %range,
            if_match = ?conditions.if_match,
            if_unmodified_since = ?conditions.if_unmodified_since,
            "fetching"
        );

        let response = self.transport.fetch(&self.url, range, &conditions).await?;
        self.state.observe(&response);
        Ok(response.data)
    }

    async fn load_directory(&mut self) -> Result<CentralDirectory> {
        let search = self.options.comment_search;
        let tail_len = (EndOfCentralDirectory::SIZE + search) as u64;
        let tail = self.fetch(ByteRange::Suffix(tail_len)).await?;
        let eocd = locate_eocd(&tail, search)?;

        let offset = eocd.cd_offset as u64;
        let size = eocd.cd_size as u64;
        let data = match ByteRange::between(offset, offset + size) {
            Some(range) => self.fetch(range).await?,
            None => Vec::new(),
        };
        if data.len() as u64 != size {
            return Err(ZipError::TruncatedCentralDirectory(format!(
                "expected {size} bytes at offset {offset}, received {}",
                data.len()
            )));
        }

        let entries = parse_central_directory(&data)?;
        if entries.len() != eocd.total_entries as usize {
            debug!(
                declared = eocd.total_entries,
                parsed = entries.len(),
                "entry count differs from End of Central Directory"
            );
        }
        debug!(entries = entries.len(), offset, "loaded Central Directory");

        Ok(CentralDirectory { entries, offset })
    }

    /// One extraction attempt against the loaded directory.
    async fn retrieve(&mut self, name: &str) -> Result<Vec<u8>> {
        let directory = self.directory.as_ref().ok_or(ZipError::NotOpened)?;
        let entry = directory
            .find(name)
            .cloned()
            .ok_or_else(|| ZipError::EntryNotFound(name.to_string()))?;
        let end = directory.extent_end(&entry);

        // Local header, name, extra field and payload in a single request.
        let range = ByteRange::between(entry.lfh_offset, end)
            .ok_or_else(|| ZipError::InvalidLocalHeader(name.to_string()))?;
        let data = self.fetch(range).await?;

        let start = local_data_start(&data, name)?;
        let payload = usize::try_from(entry.compressed_size)
            .ok()
            .and_then(|size| data.get(start..)?.get(..size))
            .ok_or_else(|| ZipError::SizeMismatch {
                name: name.to_string(),
                expected: entry.compressed_size,
                actual: data.len().saturating_sub(start) as u64,
            })?;

        let size_hint = (entry.uncompressed_size as usize).min(MAX_PREALLOC);
        let content = decompress(payload, entry.compression_method, size_hint)?;
        if content.len() as u64 != entry.uncompressed_size {
            return Err(ZipError::SizeMismatch {
                name: name.to_string(),
                expected: entry.uncompressed_size,
                actual: content.len() as u64,
            });
        }

        Ok(content)
    }
}
