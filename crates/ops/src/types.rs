//! Types for operations and results

use std::collections::BTreeMap;
use std::path::PathBuf;

use modsync_checker::{ModuleReport, Verification};
use modsync_errors::ErrorSet;
use modsync_install::DownloadedFile;
use modsync_types::ModuleStatus;
use serde::Serialize;

/// Outcome of an install run
#[derive(Clone, Debug, Serialize)]
pub struct InstallReport {
    pub root: PathBuf,
    /// Modules that contributed at least one file
    pub modules: Vec<String>,
    pub files: Vec<DownloadedFile>,
    pub bytes: u64,
    /// Modules left out, with the reason
    pub warnings: Vec<String>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
}

/// Per-source result for one module
#[derive(Clone, Debug, Serialize)]
pub struct CheckSummary {
    pub files: usize,
    pub failures: Vec<String>,
}

impl From<&ModuleReport> for CheckSummary {
    fn from(report: &ModuleReport) -> Self {
        Self {
            files: report.files,
            failures: report.failures.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Status line of one module
#[derive(Clone, Debug, Serialize)]
pub struct ModuleSummary {
    pub module: String,
    pub status: ModuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<CheckSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<CheckSummary>,
}

/// Outcome of a verify run
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    pub root: PathBuf,
    pub remote: bool,
    pub modules: Vec<ModuleSummary>,
    /// Manifests that could not be acquired
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl VerifyReport {
    pub(crate) fn new(
        root: PathBuf,
        remote: bool,
        verification: &Verification,
        duration_ms: u64,
    ) -> Self {
        let modules = verification
            .statuses
            .iter()
            .map(|(module, status)| ModuleSummary {
                module: module.to_string(),
                status,
                local: verification.local.get(module).map(CheckSummary::from),
                remote: verification.remote.get(module).map(CheckSummary::from),
            })
            .collect();

        Self {
            root,
            remote,
            modules,
            errors: messages(&verification.errors),
            duration_ms,
        }
    }

    /// Every evaluated module matched its manifest
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.modules.iter().all(|module| module.status.is_valid())
    }

    #[must_use]
    pub fn status_of(&self, module: &str) -> Option<ModuleStatus> {
        self.modules
            .iter()
            .find(|summary| summary.module == module)
            .map(|summary| summary.status)
    }
}

/// Outcome of an update run
#[derive(Clone, Debug, Serialize)]
pub struct UpdateReport {
    pub root: PathBuf,
    /// Status of every evaluated module before anything was downloaded
    pub before: BTreeMap<String, ModuleStatus>,
    /// Modules whose files were downloaded again
    pub refreshed: Vec<String>,
    /// Modules already up to date
    pub current: Vec<String>,
    pub files: Vec<DownloadedFile>,
    pub bytes: u64,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl UpdateReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.refreshed.is_empty()
    }
}

pub(crate) fn messages(errors: &ErrorSet) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
