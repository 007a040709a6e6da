#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for modsync
//!
//! This crate sits between the CLI and the specialized crates. Each
//! operation runs inside [`OpsCtx::run`], which applies cancellation and the
//! configured deadline and reports the operation lifecycle as events.

mod context;
mod install;
mod types;
mod update;
mod verify;

pub use context::{OpsContextBuilder, OpsCtx};
pub use types::{CheckSummary, InstallReport, ModuleSummary, UpdateReport, VerifyReport};

pub use install::install;
pub use update::update;
pub use verify::verify;

use modsync_errors::Error;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    InstallReport(InstallReport),
    VerifyReport(VerifyReport),
    UpdateReport(UpdateReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::InstallReport(_) | OperationResult::UpdateReport(_) => true,
            OperationResult::VerifyReport(report) => report.is_valid(),
        }
    }
}
