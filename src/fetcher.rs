use log::info;
use reqwest::blocking::{Client, Response};
use std::fs;
use std::path::{Path, PathBuf};

use crate::download;
use crate::error::FetchError;
use crate::extract;

/// A single download-then-extract request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP or HTTPS URL of the zip payload.
    pub url: String,
    /// Directory to unpack into; created if it does not exist.
    pub destination: PathBuf,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }
}

/// Downloads packages over HTTP and unpacks them into target directories.
///
/// Each call is independent and owns its own temporary spool file, so
/// concurrent calls against distinct destinations are safe. Two calls
/// racing on the same destination are the caller's problem.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::transport)?;
        Ok(Self { client })
    }

    /// Downloads `request.url` and unpacks the zip payload into
    /// `request.destination`.
    ///
    /// The payload is spooled into a temporary directory that is removed on
    /// every exit path. The destination directory is only created once the
    /// payload has passed the zip checks; a fetch that fails earlier (bad
    /// status, transport error, non-zip payload) leaves it untouched.
    pub fn fetch(&self, request: &FetchRequest) -> Result<(), FetchError> {
        info!(
            "Fetching {} into {}",
            request.url,
            request.destination.display()
        );

        let mut response = self.get(&request.url)?;

        let spool = tempfile::tempdir()?;
        let artifact = spool.path().join("payload.zip");
        let mut file = fs::File::create(&artifact)?;
        let size = download::save_body(&mut response, &mut file)?;
        drop(file);
        info!("Downloaded {} bytes from {}", size, request.url);

        extract::unpack(&artifact, &request.destination)
    }

    /// Downloads `url` into the file at `output` without unpacking it,
    /// creating parent directories as needed. Returns the byte count.
    ///
    /// The payload is written in place, so a failed transfer can leave a
    /// partial file behind.
    pub fn download(&self, url: &str, output: &Path) -> Result<u64, FetchError> {
        info!("Downloading {} to {}", url, output.display());

        let mut response = self.get(url)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(output)?;
        let written = download::save_body(&mut response, &mut file)?;

        info!("Download completed: {} bytes", written);
        Ok(written)
    }

    fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus { status });
        }
        Ok(response)
    }
}
