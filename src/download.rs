use log::debug;
use reqwest::blocking::Response;
use std::io::{Read, Write};

use crate::error::FetchError;

/// Copy buffer used while streaming a response body to disk, so large
/// archives never sit in memory whole.
const CHUNK_SIZE: usize = 8 * 1024;

/// Streams the body of `response` into `out` and flushes it, returning the
/// number of bytes written.
///
/// Read failures come from the HTTP collaborator and surface as
/// [`FetchError::Transport`]; write failures are local filesystem errors.
pub(crate) fn save_body<W: Write>(response: &mut Response, out: &mut W) -> Result<u64, FetchError> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let read = response.read(&mut chunk).map_err(FetchError::transport)?;
        if read == 0 {
            break;
        }
        out.write_all(&chunk[..read])?;
        written += read as u64;
    }
    out.flush()?;

    debug!("Transferred {} bytes", written);
    Ok(written)
}
