//! Streaming file download with hashing and cancellation

use futures::StreamExt;
use modsync_errors::{Error, NetworkError};
use modsync_hash::{Hash, Hasher};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ensure_success, NetClient};

/// Download operation handle
#[derive(Debug)]
pub struct Download {
    url: Url,
}

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub size: u64,
    /// Digest of the bytes written
    pub hash: Hash,
    /// Length announced by the server, if any
    pub content_length: Option<u64>,
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self { url })
    }

    /// Stream the body into `dest`, hashing it on the way
    ///
    /// The destination is created or truncated; parent directories are
    /// created as needed. A tripped `cancel` token aborts the request or the
    /// copy loop at the next chunk and returns [`Error::Cancelled`]. Bytes
    /// already written stay on disk.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status, a broken body stream,
    /// a filesystem failure, or cancellation.
    pub async fn execute(
        self,
        client: &NetClient,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, Error> {
        let url = self.url.to_string();

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            response = client.get(&url) => response?,
        };
        let response = ensure_success(response, &url)?;
        let content_length = response.content_length();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        let mut file = File::create(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        let mut stream = response.bytes_stream();
        let mut hasher = Hasher::new();

        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")))?;

            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        let size = hasher.bytes_hashed();
        Ok(DownloadResult {
            url,
            size,
            hash: hasher.finalize(),
            content_length,
        })
    }
}
