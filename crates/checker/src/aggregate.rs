//! Manifest acquisition from disk and from providers

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use modsync_errors::{Error, ErrorSet, ProviderError};
use modsync_events::{AppEvent, EventEmitter, FailureContext, ProviderEvent, VerifyEvent};
use modsync_provider::ProviderRegistry;
use modsync_types::{module_from_manifest_file, Arch, Branch, Manifest, ManifestSource};
use walkdir::WalkDir;

/// Manifests gathered from one source, plus what went wrong gathering them
///
/// Errors do not imply an empty set: some modules may have been collected
/// while others failed.
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    pub manifests: BTreeMap<String, Manifest>,
    pub errors: ErrorSet,
}

impl ManifestSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.manifests.keys().map(String::as_str)
    }

    /// Keep the set unless nothing was collected and something failed
    ///
    /// # Errors
    ///
    /// Returns the joined collection errors when no manifest was collected.
    pub fn into_usable(self) -> Result<Self, Error> {
        if !self.manifests.is_empty() {
            return Ok(self);
        }
        match self.errors.into_error() {
            Some(err) => Err(err),
            None => Ok(Self::default()),
        }
    }
}

/// Scan `root` for `<module>.update.json` files and parse them
///
/// A malformed or unreadable file is recorded and the scan goes on. A
/// missing root yields an empty set.
pub async fn collect_local_manifests<E>(root: &Path, tx: &E) -> ManifestSet
where
    E: EventEmitter + Sync,
{
    let mut set = ManifestSet::default();

    let walk_root = root.to_path_buf();
    let (found, walk_errors) =
        match tokio::task::spawn_blocking(move || find_manifest_files(&walk_root)).await {
            Ok(found) => found,
            Err(e) => {
                set.errors
                    .push(Error::internal(format!("manifest scan task failed: {e}")));
                return set;
            }
        };
    set.errors.extend(walk_errors);

    for (module, path) in found {
        match read_manifest(&path).await {
            Ok(manifest) => {
                if set.manifests.insert(module.clone(), manifest).is_some() {
                    tx.emit_warning(format!(
                        "more than one manifest for {module}, using {}",
                        path.display()
                    ));
                }
            }
            Err(e) => {
                tx.emit_warning_with_context("skipping unreadable local manifest", e.to_string());
                set.errors.push(e);
            }
        }
    }

    tx.emit(AppEvent::Verify(VerifyEvent::ManifestsCollected {
        source: ManifestSource::Local,
        modules: set.modules().map(str::to_string).collect(),
    }));
    set
}

fn find_manifest_files(root: &Path) -> (Vec<(String, PathBuf)>, Vec<Error>) {
    let mut found = Vec::new();
    let mut errors = Vec::new();

    if !root.exists() {
        return (found, errors);
    }

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(Error::Io {
                    kind: e.io_error().map_or(io::ErrorKind::Other, io::Error::kind),
                    message: e.to_string(),
                    path: e.path().map(Path::to_path_buf),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(module) = entry.file_name().to_str().and_then(module_from_manifest_file) else {
            continue;
        };
        found.push((module.to_string(), entry.path().to_path_buf()));
    }

    (found, errors)
}

async fn read_manifest(path: &Path) -> Result<Manifest, Error> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    Manifest::from_json(&text, &path.display().to_string())
}

/// Fetch the manifest of every module through its provider
///
/// Modules without a provider or whose fetch fails are left out and their
/// errors joined; up to `concurrency` fetches run at once.
pub async fn collect_remote_manifests<E>(
    registry: &ProviderRegistry,
    branch: Branch,
    arch: Arch,
    modules: &[String],
    concurrency: usize,
    tx: &E,
) -> ManifestSet
where
    E: EventEmitter + Sync,
{
    let results: Vec<(String, Result<Manifest, Error>)> = stream::iter(modules)
        .map(|module| async move {
            let result = fetch_remote_manifest(registry, branch, arch, module, tx).await;
            (module.clone(), result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut set = ManifestSet::default();
    for (module, result) in results {
        match result {
            Ok(manifest) => {
                set.manifests.insert(module, manifest);
            }
            Err(e) => set.errors.push(e),
        }
    }

    tx.emit(AppEvent::Verify(VerifyEvent::ManifestsCollected {
        source: ManifestSource::Remote,
        modules: set.modules().map(str::to_string).collect(),
    }));
    set
}

async fn fetch_remote_manifest<E: EventEmitter>(
    registry: &ProviderRegistry,
    branch: Branch,
    arch: Arch,
    module: &str,
    tx: &E,
) -> Result<Manifest, Error> {
    let Some(provider) = registry.resolve(module) else {
        tx.emit(AppEvent::Provider(ProviderEvent::Missing {
            module: module.to_string(),
        }));
        return Err(ProviderError::NoProviderForModule {
            module: module.to_string(),
        }
        .into());
    };
    tx.emit(AppEvent::Provider(ProviderEvent::Resolved {
        module: module.to_string(),
        provider: provider.name().to_string(),
    }));

    match provider.manifest(branch, arch, module).await {
        Ok(manifest) => {
            tx.emit(AppEvent::Provider(ProviderEvent::ManifestFetched {
                module: module.to_string(),
                provider: provider.name().to_string(),
                version: manifest.version.clone(),
                build_number: manifest.build_number,
                files: manifest.len(),
            }));
            Ok(manifest)
        }
        Err(e) if e.is_interruption() => Err(e),
        Err(e) => {
            tx.emit(AppEvent::Provider(ProviderEvent::ManifestFailed {
                module: module.to_string(),
                failure: FailureContext::from_error(&e),
            }));
            Err(ProviderError::ManifestFetchFailed {
                module: module.to_string(),
                reason: e.to_string(),
            }
            .into())
        }
    }
}
