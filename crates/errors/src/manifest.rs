//! Manifest error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("failed to parse manifest {path}: {message}")]
    ParseFailed { path: String, message: String },

    #[error("invalid hash for {path}: {value}")]
    InvalidHash { path: String, value: String },

    #[error("file path escapes the install root: {path}")]
    UnsafePath { path: String },
}

impl UserFacingError for ManifestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ParseFailed { .. } => {
                Some("Delete the broken manifest and run `modsync install` to restore it.")
            }
            Self::InvalidHash { .. } | Self::UnsafePath { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::ParseFailed { .. } => "manifest.parse_failed",
            Self::InvalidHash { .. } => "manifest.invalid_hash",
            Self::UnsafePath { .. } => "manifest.unsafe_path",
        })
    }
}
