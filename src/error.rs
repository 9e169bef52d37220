use thiserror::Error;

/// Errors raised while reading a remote ZIP archive.
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("read of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("End of Central Directory record not found")]
    EocdNotFound,

    #[error("Invalid Central Directory File Header at offset {0}")]
    InvalidCentralDirectory(usize),

    #[error("Central Directory truncated: {0}")]
    TruncatedCentralDirectory(String),

    #[error("Invalid Local File Header for {0}")]
    InvalidLocalHeader(String),

    #[error("archive has not been opened")]
    NotOpened,

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("remote resource changed (precondition failed)")]
    PreconditionFailed,

    #[error("HTTP request failed with status: {0}")]
    Status(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("corrupt deflate stream: {0}")]
    Decompress(String),

    #[error("size mismatch for {name}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("{name} is not valid {encoding}")]
    MalformedText {
        name: String,
        encoding: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ZipError>;
