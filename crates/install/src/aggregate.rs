//! Module -> file list expansion

use futures::future::join_all;
use modsync_errors::{Error, ErrorSet, ProviderError};
use modsync_events::{AppEvent, EventEmitter, ProviderEvent};
use modsync_provider::ProviderRegistry;
use modsync_types::{Arch, Branch, File};

/// Files to fetch, plus the modules that had to be left out
#[derive(Debug, Clone, Default)]
pub struct FileList {
    pub files: Vec<File>,
    pub skipped: ErrorSet,
}

impl FileList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of expected sizes, when every file announces one
    #[must_use]
    pub fn total_size(&self) -> Option<u64> {
        self.files.iter().map(|file| file.size).sum()
    }
}

/// Expand every module into its files, in module order
///
/// A module without a provider, or whose listing fails, is skipped with a
/// warning and recorded in [`FileList::skipped`].
pub async fn aggregate_files<E: EventEmitter>(
    registry: &ProviderRegistry,
    branch: Branch,
    arch: Arch,
    modules: &[String],
    include_manifests: bool,
    tx: &E,
) -> FileList {
    let listings = join_all(modules.iter().map(|module| async move {
        let Some(provider) = registry.resolve(module) else {
            tx.emit(AppEvent::Provider(ProviderEvent::Missing {
                module: module.clone(),
            }));
            return Err(Error::from(ProviderError::NoProviderForModule {
                module: module.clone(),
            }));
        };
        tx.emit(AppEvent::Provider(ProviderEvent::Resolved {
            module: module.clone(),
            provider: provider.name().to_string(),
        }));

        provider
            .files(branch, arch, module, include_manifests)
            .await
            .map_err(|e| {
                if e.is_interruption() {
                    e
                } else {
                    ProviderError::ManifestFetchFailed {
                        module: module.clone(),
                        reason: e.to_string(),
                    }
                    .into()
                }
            })
    }))
    .await;

    let mut list = FileList::default();
    for (module, listing) in modules.iter().zip(listings) {
        match listing {
            Ok(files) => list.files.extend(files),
            Err(e) => {
                tx.emit_warning_with_context(format!("skipping module {module}"), e.to_string());
                list.skipped.push(e);
            }
        }
    }
    list
}
