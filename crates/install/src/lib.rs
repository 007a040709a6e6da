#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Module installation for modsync
//!
//! Expands requested modules into concrete files through the provider
//! registry, then downloads them with bounded parallelism. Each file is
//! hashed while it streams to disk and checked against the digest and size
//! its manifest published.

mod aggregate;
mod batch;

pub use aggregate::{aggregate_files, FileList};
pub use batch::{download_all, DownloadSummary, DownloadedFile};

use std::path::Path;

use modsync_errors::Error;
use modsync_events::{EventEmitter, EventSender};
use modsync_net::{CancellationToken, NetClient};
use modsync_provider::ProviderRegistry;
use modsync_types::{Arch, Branch, File};

/// Downloads in flight at once when no limit is given
pub const DEFAULT_PARALLELISM: usize = 4;

/// Installs modules for one branch and architecture
#[derive(Debug)]
pub struct Downloader<'a> {
    registry: &'a ProviderRegistry,
    client: NetClient,
    branch: Branch,
    arch: Arch,
    parallel: usize,
    tx: Option<EventSender>,
}

impl<'a> Downloader<'a> {
    #[must_use]
    pub fn new(registry: &'a ProviderRegistry, client: NetClient, branch: Branch, arch: Arch) -> Self {
        Self {
            registry,
            client,
            branch,
            arch,
            parallel: DEFAULT_PARALLELISM,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    #[must_use]
    pub fn with_events(mut self, tx: Option<EventSender>) -> Self {
        self.tx = tx;
        self
    }

    /// List the files of `modules`, optionally with their manifests
    pub async fn aggregate_files(&self, modules: &[String], include_manifests: bool) -> FileList {
        aggregate_files(
            self.registry,
            self.branch,
            self.arch,
            modules,
            include_manifests,
            self,
        )
        .await
    }

    /// Download `files` under `root`
    ///
    /// # Errors
    ///
    /// See [`download_all`].
    pub async fn download(
        &self,
        root: &Path,
        files: Vec<File>,
        cancel: &CancellationToken,
    ) -> Result<DownloadSummary, Error> {
        download_all(
            &self.client,
            root,
            files,
            self.parallel,
            cancel,
            self.tx.clone(),
        )
        .await
    }
}

impl EventEmitter for Downloader<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
