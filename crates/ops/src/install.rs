//! Install command implementation
//!
//! Expands modules into files through the provider registry and downloads
//! them into the install root. Delegates to `modsync_install` for the work.

use std::collections::BTreeSet;
use std::time::Instant;

use modsync_errors::{Error, InstallError};
use modsync_events::EventEmitter;
use modsync_install::{DownloadSummary, FileList};

use crate::types::{elapsed_ms, messages};
use crate::{InstallReport, OpsCtx};

/// Install `modules` into the configured root
///
/// Modules without a provider or whose listing fails are skipped with a
/// warning, as long as at least one file remains.
///
/// # Errors
///
/// Returns an error if no file could be listed, any download fails, or the
/// run is cancelled or exceeds its deadline.
pub async fn install(
    ctx: &OpsCtx,
    modules: &[String],
    include_manifests: bool,
) -> Result<InstallReport, Error> {
    let start = Instant::now();

    ctx.run("install", async {
        let list = ctx.downloader().aggregate_files(modules, include_manifests).await;
        if list.is_empty() {
            return Err(list
                .skipped
                .into_error()
                .unwrap_or_else(|| InstallError::NothingToDownload.into()));
        }

        let fetched = download_listed(ctx, list).await?;
        Ok(InstallReport {
            root: ctx.root().to_path_buf(),
            modules: fetched.modules.into_iter().collect(),
            bytes: fetched.summary.bytes,
            files: fetched.summary.files,
            warnings: fetched.warnings,
            duration_ms: elapsed_ms(start),
        })
    })
    .await
}

/// Files written for a set of modules
pub(crate) struct Fetched {
    pub modules: BTreeSet<String>,
    pub summary: DownloadSummary,
    pub warnings: Vec<String>,
}

/// Download a module listing, shared by install and update
pub(crate) async fn download_listed(ctx: &OpsCtx, list: FileList) -> Result<Fetched, Error> {
    ctx.emit_debug(format!(
        "{} files into {}",
        list.files.len(),
        ctx.root().display()
    ));

    let modules = list.files.iter().map(|file| file.module.clone()).collect();
    let warnings = messages(&list.skipped);
    let summary = ctx
        .downloader()
        .download(ctx.root(), list.files, &ctx.cancel)
        .await?;

    Ok(Fetched {
        modules,
        summary,
        warnings,
    })
}
