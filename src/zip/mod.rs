//! ZIP archive parsing and remote extraction.
//!
//! This module reads ZIP archives through byte-range requests, fetching only
//! the records it needs.
//!
//! ## Architecture
//!
//! - [`bytes`]: bounds-checked little-endian field access
//! - [`structures`]: data structures representing ZIP format elements
//! - [`parser`]: parsing of ZIP records from fetched bytes
//! - [`decompress`]: STORED and raw DEFLATE payload decoding
//! - [`consistency`]: version pinning across dependent requests
//! - [`archive`]: the [`RemoteZip`] handle tying the above to a transport
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Opening an archive costs two requests (the tail, then the Central
//! Directory); each extraction costs one more, covering the Local File
//! Header and the compressed data up to the next header.
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No encryption support
//! - No multi-disk archive support
//! - Only STORED and DEFLATE compression methods
//! - Archive comments longer than the configured search window (16 bytes by
//!   default) hide the EOCD

pub mod archive;
pub mod bytes;
pub mod consistency;
pub mod decompress;
pub mod parser;
pub mod structures;

pub use archive::{ArchiveOptions, RemoteZip};
pub use consistency::ConsistencyState;
pub use decompress::decompress;
pub use structures::*;
