use modsync_types::ManifestSource;
use serde::{Deserialize, Serialize};

/// Verification progress events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerifyEvent {
    ManifestsCollected {
        source: ManifestSource,
        modules: Vec<String>,
    },

    ModuleStarted {
        module: String,
        source: ManifestSource,
        files: usize,
    },

    FileMismatch {
        module: String,
        source: ManifestSource,
        path: String,
        reason: String,
    },

    ModuleCompleted {
        module: String,
        source: ManifestSource,
        valid: bool,
        failures: usize,
    },
}
