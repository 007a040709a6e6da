#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for modsync
//!
//! Shared HTTP client with retry logic, small text/JSON fetch helpers used for
//! manifests and release listings, and a cancellable streaming download that
//! hashes the body while writing it.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{Download, DownloadResult};
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use tokio_util::sync::CancellationToken;

use modsync_errors::{Error, NetworkError};
use modsync_events::EventEmitter;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::path::Path;
use url::Url;

/// Download a file into `dest`, returning its digest and size
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, there are
/// I/O errors while writing the file, or `cancel` fires.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<DownloadResult, Error> {
    Download::new(url)?.execute(client, dest, cancel).await
}

/// Fetch text content from a URL
///
/// # Errors
///
/// Returns an error if the request fails, the server returns a non-success
/// status, or the body cannot be decoded as text.
pub async fn fetch_text<E: EventEmitter>(
    client: &NetClient,
    url: &str,
    tx: &E,
) -> Result<String, Error> {
    tx.emit_debug(format!("Fetching text from {url}"));

    let response = ensure_success(client.get(url).await?, url)?;
    response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")).into())
}

/// Fetch and decode a JSON document
///
/// # Errors
///
/// Returns an error if the request fails, the status is not a success, or the
/// body is not valid JSON for `T`.
pub async fn fetch_json<T, E>(
    client: &NetClient,
    url: &str,
    headers: &HeaderMap,
    tx: &E,
) -> Result<T, Error>
where
    T: DeserializeOwned,
    E: EventEmitter,
{
    tx.emit_debug(format!("Fetching JSON from {url}"));

    let response = ensure_success(client.get_with_headers(url, headers).await?, url)?;
    let body = response
        .bytes()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")))?;
    serde_json::from_slice(&body).map_err(Into::into)
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

/// Map a non-2xx response to [`NetworkError::HttpError`]
pub(crate) fn ensure_success(response: Response, url: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NetworkError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        }
        .into())
    }
}
