//! Merging local and remote verification outcomes

use std::collections::BTreeMap;

use modsync_errors::{Error, VerifyError};
use modsync_types::{ModuleStatus, ModuleStatusResult, Validity};

use crate::ModuleReport;

/// Which manifests a verification run checks against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    LocalOnly,
    RemoteOnly,
    /// Local for validity, remote for freshness
    Both,
}

impl Plan {
    /// Pick the plan from whether local manifests exist and remote is allowed
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::NothingToVerify`] when neither is available.
    pub fn select(local_found: bool, remote_allowed: bool) -> Result<Self, Error> {
        match (local_found, remote_allowed) {
            (false, false) => Err(VerifyError::NothingToVerify.into()),
            (true, false) => Ok(Self::LocalOnly),
            (false, true) => Ok(Self::RemoteOnly),
            (true, true) => Ok(Self::Both),
        }
    }
}

/// Fold the remote verdict for a module into its local status
///
/// A remote mismatch is read as "a different version exists", never as a
/// broken remote manifest.
#[must_use]
pub fn merge(local: ModuleStatus, remote: ModuleStatus) -> ModuleStatus {
    match remote.validity {
        Some(Validity::Invalid) => local | ModuleStatus::UPGRADABLE,
        Some(Validity::Valid) => local | ModuleStatus::UP_TO_DATE,
        None => local,
    }
}

/// Statuses of a single-source run
#[must_use]
pub fn statuses(reports: &BTreeMap<String, ModuleReport>) -> ModuleStatusResult {
    reports
        .iter()
        .map(|(module, report)| (module.clone(), report.status))
        .collect()
}

/// Statuses of a combined run, keyed by the local modules
///
/// Modules without a remote counterpart keep their local status and gain no
/// freshness facet.
#[must_use]
pub fn reconcile(
    local: &BTreeMap<String, ModuleReport>,
    remote: &BTreeMap<String, ModuleReport>,
) -> ModuleStatusResult {
    local
        .iter()
        .map(|(module, report)| {
            let status = match remote.get(module) {
                Some(remote) => merge(report.status, remote.status),
                None => report.status,
            };
            (module.clone(), status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsync_types::ManifestSource;
    use proptest::prelude::*;

    fn report(module: &str, source: ManifestSource, status: ModuleStatus) -> ModuleReport {
        ModuleReport {
            module: module.to_string(),
            source,
            status,
            files: 1,
            failures: Vec::new(),
        }
    }

    fn reports(
        source: ManifestSource,
        entries: &[(&str, ModuleStatus)],
    ) -> BTreeMap<String, ModuleReport> {
        entries
            .iter()
            .map(|(module, status)| ((*module).to_string(), report(module, source, *status)))
            .collect()
    }

    #[test]
    fn merge_table() {
        use ModuleStatus as S;
        assert_eq!(merge(S::VALID, S::VALID), S::VALID | S::UP_TO_DATE);
        assert_eq!(merge(S::VALID, S::INVALID), S::VALID | S::UPGRADABLE);
        assert_eq!(merge(S::INVALID, S::VALID), S::INVALID | S::UP_TO_DATE);
        assert_eq!(merge(S::INVALID, S::INVALID), S::INVALID | S::UPGRADABLE);
        assert_eq!(merge(S::VALID, S::UNKNOWN), S::VALID);
    }

    #[test]
    fn plan_selection() {
        assert!(matches!(
            Plan::select(false, false),
            Err(Error::Verify(VerifyError::NothingToVerify))
        ));
        assert_eq!(Plan::select(true, false).unwrap(), Plan::LocalOnly);
        assert_eq!(Plan::select(false, true).unwrap(), Plan::RemoteOnly);
        assert_eq!(Plan::select(true, true).unwrap(), Plan::Both);
    }

    #[test]
    fn local_only_modules_carry_through() {
        let local = reports(
            ManifestSource::Local,
            &[
                ("server", ModuleStatus::VALID),
                ("js-module", ModuleStatus::INVALID),
            ],
        );
        let remote = reports(
            ManifestSource::Remote,
            &[
                ("server", ModuleStatus::INVALID),
                ("data-files", ModuleStatus::VALID),
            ],
        );

        let merged = reconcile(&local, &remote);

        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get("server"),
            Some(ModuleStatus::VALID | ModuleStatus::UPGRADABLE)
        );
        assert_eq!(merged.get("js-module"), Some(ModuleStatus::INVALID));
        assert_eq!(merged.get("data-files"), None);
    }

    fn validity() -> impl Strategy<Value = ModuleStatus> {
        prop_oneof![Just(ModuleStatus::VALID), Just(ModuleStatus::INVALID)]
    }

    proptest! {
        #[test]
        fn merge_keeps_local_validity_and_sets_freshness(local in validity(), remote in validity()) {
            let merged = merge(local, remote);
            prop_assert_eq!(merged.validity, local.validity);
            prop_assert!(merged.freshness.is_some());
            prop_assert_eq!(merged.contains(ModuleStatus::UP_TO_DATE), remote.is_valid());
        }
    }
}
