use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;
use zip::result::ZipError;

/// Everything that can go wrong while fetching one package.
///
/// Callers branch on the variant, not on message text. No variant is fatal
/// to the process; whether to retry or abort is the caller's call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered outside the 2xx range.
    #[error("server responded with HTTP status {status}")]
    HttpStatus { status: StatusCode },

    /// Network-level failure while sending the request or streaming the body.
    #[error("transfer failed: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The downloaded payload does not start with a zip signature.
    #[error("downloaded payload is not a zip archive")]
    NotAZip,

    /// A file went missing mid-operation (temporary artifact or destination).
    #[error("file not found during extraction")]
    FileNotFound(#[source] io::Error),

    /// The payload passed the signature check but failed structural parsing.
    #[error("corrupt zip archive: {0}")]
    CorruptArchive(String),

    /// The payload is bigger than 32-bit zip size fields can address.
    #[error("archive of {size} bytes exceeds the 4 GiB limit")]
    ArchiveTooLarge { size: u64 },

    /// Filesystem failure with no narrower kind.
    #[error(transparent)]
    Io(io::Error),
}

impl FetchError {
    pub(crate) fn transport(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        FetchError::Transport(err.into())
    }

    /// Translates an I/O failure seen while reading entry data out of an
    /// archive. Truncated or undecodable entries are corruption, not
    /// generic I/O.
    pub(crate) fn entry_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => {
                FetchError::CorruptArchive(err.to_string())
            }
            _ => err.into(),
        }
    }
}

impl From<io::Error> for FetchError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            FetchError::FileNotFound(err)
        } else {
            FetchError::Io(err)
        }
    }
}

impl From<ZipError> for FetchError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(io) => io.into(),
            ZipError::InvalidArchive(msg) | ZipError::UnsupportedArchive(msg) => {
                FetchError::CorruptArchive(msg.to_string())
            }
            ZipError::FileNotFound => {
                FetchError::CorruptArchive("archive entry not found".to_string())
            }
        }
    }
}
