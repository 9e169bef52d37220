//! # rangezip
//!
//! Random access to single entries of remote ZIP archives.
//!
//! The archive is never downloaded in full. Opening it fetches the tail of
//! the resource to find the End of Central Directory, then the Central
//! Directory itself; each extraction fetches one more byte range holding the
//! entry's Local File Header and compressed data.
//!
//! Every request after the first carries `If-Match` (or
//! `If-Unmodified-Since`) for the version seen so far. When the archive is
//! replaced on the server mid-way, the extraction reloads the directory and
//! retries a bounded number of times instead of mixing two versions.
//!
//! ## Features
//!
//! - HTTP/HTTPS sources via Range requests ([`HttpRangeTransport`])
//! - Local files through the same interface ([`LocalFileTransport`])
//! - STORED and raw DEFLATE entries
//! - Text extraction in any WHATWG encoding
//!
//! ## Example
//!
//! ```no_run
//! use rangezip::{HttpRangeTransport, RemoteZip};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = HttpRangeTransport::new()?;
//!     let mut archive = RemoteZip::new("https://example.com/archive.zip", transport);
//!     archive.open().await?;
//!
//!     for name in archive.files()? {
//!         println!("{name}");
//!     }
//!
//!     let readme = archive.extract_text_file("README.md", None).await?;
//!     println!("{readme}");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod text;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{
    ByteRange, HttpRangeTransport, LocalFileTransport, Preconditions, RangeResponse,
    RangeTransport,
};
pub use zip::{ArchiveOptions, RemoteZip, ZipFileEntry};
