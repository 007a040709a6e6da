//! Update command implementation
//!
//! Verifies against the latest remote manifests first, then downloads only
//! the modules that are not both valid and up to date.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use modsync_checker::Verification;
use modsync_errors::Error;
use modsync_events::EventEmitter;

use crate::install::download_listed;
use crate::types::{elapsed_ms, messages};
use crate::{OpsCtx, UpdateReport};

/// Bring `modules` (and any module already installed) up to date
///
/// Refreshed modules always get their manifest file, so a later local
/// verification can find them.
///
/// # Errors
///
/// Returns an error if the remote check cannot evaluate anything, a
/// download fails, or the run is cancelled or exceeds its deadline.
pub async fn update(ctx: &OpsCtx, modules: &[String]) -> Result<UpdateReport, Error> {
    let start = Instant::now();

    ctx.run("update", async {
        let verification = ctx.checker(modules).verify(ctx.root(), true).await?;
        let (stale, current) = partition(modules, &verification);
        let mut warnings = messages(&verification.errors);

        let before: BTreeMap<String, _> = verification
            .statuses
            .iter()
            .map(|(module, status)| (module.to_string(), status))
            .collect();

        let mut report = UpdateReport {
            root: ctx.root().to_path_buf(),
            before,
            refreshed: Vec::new(),
            current,
            files: Vec::new(),
            bytes: 0,
            warnings: Vec::new(),
            duration_ms: 0,
        };

        if stale.is_empty() {
            ctx.emit_debug("every module is up to date");
        } else {
            ctx.emit_debug(format!("refreshing {}", stale.join(", ")));
            let list = ctx.downloader().aggregate_files(&stale, true).await;
            if list.is_empty() {
                warnings.extend(messages(&list.skipped));
            } else {
                let fetched = download_listed(ctx, list).await?;
                warnings.extend(fetched.warnings);
                report.refreshed = fetched.modules.into_iter().collect();
                report.bytes = fetched.summary.bytes;
                report.files = fetched.summary.files;
            }
        }

        report.warnings = warnings;
        report.duration_ms = elapsed_ms(start);
        Ok(report)
    })
    .await
}

/// Split requested and installed modules into (stale, current)
///
/// Without local manifests the check ran against the latest remote ones
/// only, so a valid module there is current.
fn partition(modules: &[String], verification: &Verification) -> (Vec<String>, Vec<String>) {
    let remote_only = verification.local.is_empty();
    let candidates: BTreeSet<&str> = modules
        .iter()
        .map(String::as_str)
        .chain(verification.statuses.modules())
        .collect();

    candidates
        .into_iter()
        .map(str::to_string)
        .partition(|module| {
            !verification.statuses.get(module).is_some_and(|status| {
                status.is_current() || (remote_only && status.is_valid())
            })
        })
}
