//! Content provider error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("no provider configured for module {module}")]
    NoProviderForModule { module: String },

    #[error("failed to fetch manifest for {module}: {reason}")]
    ManifestFetchFailed { module: String, reason: String },

    #[error("no release of {module} matches branch {branch}")]
    NoMatchingRelease { module: String, branch: String },

    #[error("release {release} of {module} has no matching assets")]
    NoAssets { module: String, release: String },

    #[error("provider does not serve module {module}")]
    UnsupportedModule { module: String },
}

impl ProviderError {
    /// Module the failure is about
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::NoProviderForModule { module }
            | Self::ManifestFetchFailed { module, .. }
            | Self::NoMatchingRelease { module, .. }
            | Self::NoAssets { module, .. }
            | Self::UnsupportedModule { module } => module,
        }
    }
}

impl UserFacingError for ProviderError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoProviderForModule { .. } | Self::UnsupportedModule { .. } => Some(
                "Check the module name, or enable the release host provider with `--github`.",
            ),
            Self::NoMatchingRelease { .. } | Self::NoAssets { .. } => {
                Some("This module may not be published for the selected branch or architecture.")
            }
            Self::ManifestFetchFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ManifestFetchFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NoProviderForModule { .. } => "provider.no_provider",
            Self::ManifestFetchFailed { .. } => "provider.manifest_fetch_failed",
            Self::NoMatchingRelease { .. } => "provider.no_matching_release",
            Self::NoAssets { .. } => "provider.no_assets",
            Self::UnsupportedModule { .. } => "provider.unsupported_module",
        })
    }
}
