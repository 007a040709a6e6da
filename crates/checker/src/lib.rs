#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Installation verification for modsync
//!
//! Collects manifests from disk and from content providers, checks the
//! files they list, and reconciles both outcomes into one status per module:
//!
//! | local manifests | remote allowed | result |
//! |---|---|---|
//! | none | no | [`VerifyError::NothingToVerify`](modsync_errors::VerifyError::NothingToVerify) |
//! | found | no | `Valid`/`Invalid` from the local manifests |
//! | none | yes | `Valid`/`Invalid` against the latest remote manifests |
//! | found | yes | local validity plus `UpToDate`/`Upgradable` from the remote check |
//!
//! Without local manifests, the remote check tells whether the files match
//! the latest published ones, which stands in for validity.

mod aggregate;
mod integrity;
mod reconcile;

pub use aggregate::{collect_local_manifests, collect_remote_manifests, ManifestSet};
pub use integrity::{verify_file, verify_manifest, verify_manifests, ModuleReport};
pub use reconcile::{merge, reconcile, statuses, Plan};

use std::collections::BTreeMap;
use std::path::Path;

use modsync_errors::{Error, ErrorSet};
use modsync_events::{EventEmitter, EventSender};
use modsync_provider::ProviderRegistry;
use modsync_types::{Arch, Branch, Manifest, ManifestSource, ModuleStatusResult};

/// Modules verified at once when no limit is given
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Result of a verification run that produced statuses
#[derive(Debug, Clone, Default)]
pub struct Verification {
    pub statuses: ModuleStatusResult,
    pub local: BTreeMap<String, ModuleReport>,
    pub remote: BTreeMap<String, ModuleReport>,
    /// Manifest acquisition failures that left modules unevaluated
    pub errors: ErrorSet,
}

impl Verification {
    /// Some modules could not be evaluated
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Split into the status map and the joined acquisition error
    #[must_use]
    pub fn into_parts(self) -> (ModuleStatusResult, Option<Error>) {
        (self.statuses, self.errors.into_error())
    }
}

/// Verifies one install root for a branch and architecture
#[derive(Debug)]
pub struct Checker<'a> {
    registry: &'a ProviderRegistry,
    branch: Branch,
    arch: Arch,
    modules: Vec<String>,
    concurrency: usize,
    tx: Option<EventSender>,
}

impl<'a> Checker<'a> {
    /// `modules` is used for remote lookups only when no local manifest exists
    #[must_use]
    pub fn new(
        registry: &'a ProviderRegistry,
        branch: Branch,
        arch: Arch,
        modules: Vec<String>,
    ) -> Self {
        Self {
            registry,
            branch,
            arch,
            modules,
            concurrency: DEFAULT_CONCURRENCY,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_events(mut self, tx: Option<EventSender>) -> Self {
        self.tx = tx;
        self
    }

    /// Verify the files under `root`
    ///
    /// Local manifests found under `root` decide which modules are checked.
    /// With `remote`, the latest manifests are fetched for those modules (or
    /// the configured ones when there are none locally).
    ///
    /// # Errors
    ///
    /// Returns an error when nothing can be evaluated: no local manifests
    /// and remote disallowed, or every manifest source failed. Partial
    /// failures are reported in [`Verification::errors`] instead.
    pub async fn verify(&self, root: &Path, remote: bool) -> Result<Verification, Error> {
        let ManifestSet {
            manifests: local_manifests,
            errors,
        } = collect_local_manifests(root, self).await.into_usable()?;

        let plan = Plan::select(!local_manifests.is_empty(), remote)?;
        self.emit_debug(format!(
            "verifying {} with {plan:?}, {} local manifests",
            root.display(),
            local_manifests.len()
        ));

        let mut out = Verification {
            errors,
            ..Verification::default()
        };

        match plan {
            Plan::LocalOnly => {
                out.local = self
                    .verify_against(root, &local_manifests, ManifestSource::Local)
                    .await;
                out.statuses = statuses(&out.local);
            }
            Plan::RemoteOnly => {
                let fetched = self.collect_remote(&self.modules).await.into_usable()?;
                out.errors.extend(fetched.errors);
                out.remote = self
                    .verify_against(root, &fetched.manifests, ManifestSource::Remote)
                    .await;
                out.statuses = statuses(&out.remote);
            }
            Plan::Both => {
                let modules: Vec<String> = local_manifests.keys().cloned().collect();
                let (local, (remote, remote_errors)) = tokio::join!(
                    self.verify_against(root, &local_manifests, ManifestSource::Local),
                    self.remote_reports(root, &modules),
                );
                out.errors.extend(remote_errors);
                out.statuses = reconcile(&local, &remote);
                out.local = local;
                out.remote = remote;
            }
        }

        Ok(out)
    }

    async fn collect_remote(&self, modules: &[String]) -> ManifestSet {
        collect_remote_manifests(
            self.registry,
            self.branch,
            self.arch,
            modules,
            self.concurrency,
            self,
        )
        .await
    }

    async fn verify_against(
        &self,
        root: &Path,
        manifests: &BTreeMap<String, Manifest>,
        source: ManifestSource,
    ) -> BTreeMap<String, ModuleReport> {
        verify_manifests(root, manifests, source, self.concurrency, self).await
    }

    /// Fetch and check remote manifests; a total failure leaves no reports
    async fn remote_reports(
        &self,
        root: &Path,
        modules: &[String],
    ) -> (BTreeMap<String, ModuleReport>, ErrorSet) {
        let fetched = self.collect_remote(modules).await;
        let reports = self
            .verify_against(root, &fetched.manifests, ManifestSource::Remote)
            .await;
        (reports, fetched.errors)
    }
}

impl EventEmitter for Checker<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
