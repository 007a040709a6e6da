//! On-disk file verification against manifests

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use futures::stream::{self, StreamExt};
use modsync_errors::{Error, VerifyError};
use modsync_events::{AppEvent, EventEmitter, VerifyEvent};
use modsync_hash::Hash;
use modsync_types::{resolve_in_root, Manifest, ManifestSource, ModuleStatus};

/// Check one file under `root` against its expected digest and size
///
/// `None` for either expectation skips that comparison; the file must still
/// exist and be readable.
///
/// # Errors
///
/// Returns [`VerifyError::MissingFile`], [`VerifyError::FileUnreadable`],
/// [`VerifyError::ChecksumMismatch`] or [`VerifyError::SizeMismatch`], or a
/// manifest error if `relative` escapes `root`.
pub async fn verify_file(
    root: &Path,
    relative: &str,
    expected_hash: Option<&Hash>,
    expected_size: Option<u64>,
) -> Result<(), Error> {
    let path = resolve_in_root(root, relative)?;

    let (actual_hash, actual_size) = match Hash::hash_file(&path).await {
        Ok(digest) => digest,
        Err(Error::Io {
            kind: io::ErrorKind::NotFound,
            ..
        }) => {
            return Err(VerifyError::MissingFile {
                path: relative.to_string(),
            }
            .into())
        }
        Err(Error::Io { message, .. }) => {
            return Err(VerifyError::FileUnreadable {
                path: relative.to_string(),
                message,
            }
            .into())
        }
        Err(e) => return Err(e),
    };

    if let Some(expected) = expected_hash {
        if *expected != actual_hash {
            return Err(VerifyError::ChecksumMismatch {
                path: relative.to_string(),
                expected: expected.to_hex(),
                actual: actual_hash.to_hex(),
            }
            .into());
        }
    }

    if let Some(expected) = expected_size {
        if expected != actual_size {
            return Err(VerifyError::SizeMismatch {
                path: relative.to_string(),
                expected,
                actual: actual_size,
            }
            .into());
        }
    }

    Ok(())
}

/// Verification outcome of one module against one manifest
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub module: String,
    pub source: ManifestSource,
    /// `Valid` or `Invalid`, never a freshness facet
    pub status: ModuleStatus,
    pub files: usize,
    pub failures: Vec<Error>,
}

/// Check every file a manifest lists
///
/// All files are checked even after the first failure so the report is
/// complete; any failure makes the module `Invalid`.
pub async fn verify_manifest<E: EventEmitter>(
    root: &Path,
    module: &str,
    manifest: &Manifest,
    source: ManifestSource,
    tx: &E,
) -> ModuleReport {
    let files = manifest.len();
    tx.emit(AppEvent::Verify(VerifyEvent::ModuleStarted {
        module: module.to_string(),
        source,
        files,
    }));

    let mut failures = Vec::new();
    for path in manifest.paths() {
        let checked = match manifest.expected_hash(path) {
            Ok(hash) => verify_file(root, path, hash.as_ref(), manifest.expected_size(path)).await,
            Err(e) => Err(e),
        };

        if let Err(e) = checked {
            tx.emit(AppEvent::Verify(VerifyEvent::FileMismatch {
                module: module.to_string(),
                source,
                path: path.to_string(),
                reason: e.to_string(),
            }));
            failures.push(e);
        }
    }

    let status = if failures.is_empty() {
        ModuleStatus::VALID
    } else {
        ModuleStatus::INVALID
    };

    tx.emit(AppEvent::Verify(VerifyEvent::ModuleCompleted {
        module: module.to_string(),
        source,
        valid: status.is_valid(),
        failures: failures.len(),
    }));

    ModuleReport {
        module: module.to_string(),
        source,
        status,
        files,
        failures,
    }
}

/// Verify several modules, up to `concurrency` at a time
pub async fn verify_manifests<E>(
    root: &Path,
    manifests: &BTreeMap<String, Manifest>,
    source: ManifestSource,
    concurrency: usize,
    tx: &E,
) -> BTreeMap<String, ModuleReport>
where
    E: EventEmitter + Sync,
{
    stream::iter(manifests)
        .map(|(module, manifest)| verify_manifest(root, module, manifest, source, tx))
        .buffer_unordered(concurrency.max(1))
        .map(|report| (report.module.clone(), report))
        .collect()
        .await
}
