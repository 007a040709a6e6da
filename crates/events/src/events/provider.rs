use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Provider resolution and manifest acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    /// A module was matched to a content provider
    Resolved { module: String, provider: String },

    /// No registered provider claims the module
    Missing { module: String },

    /// A release was picked on a release host
    ReleaseSelected {
        module: String,
        release: String,
        assets: usize,
    },

    ManifestFetched {
        module: String,
        provider: String,
        version: String,
        build_number: i64,
        files: usize,
    },

    ManifestFailed {
        module: String,
        failure: FailureContext,
    },
}
