//! Integrity verification error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VerifyError {
    #[error("checksum mismatch for {path}: expected {expected}, got {actual} (file might be corrupted)")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("size mismatch for {path}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("missing file: {path}")]
    MissingFile { path: String },

    #[error("cannot read {path}: {message}")]
    FileUnreadable { path: String, message: String },

    #[error("no local manifests found and remote verification is disabled")]
    NothingToVerify,
}

impl UserFacingError for VerifyError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ChecksumMismatch { .. } | Self::SizeMismatch { .. } => {
                Some("The file was left on disk. Run `modsync install` to fetch it again.")
            }
            Self::MissingFile { .. } => Some("Run `modsync install` to restore missing files."),
            Self::NothingToVerify => Some(
                "Install with `--manifests` to keep local manifests, or verify with `--remote`.",
            ),
            Self::FileUnreadable { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::ChecksumMismatch { .. } => "verify.checksum_mismatch",
            Self::SizeMismatch { .. } => "verify.size_mismatch",
            Self::MissingFile { .. } => "verify.missing_file",
            Self::FileUnreadable { .. } => "verify.file_unreadable",
            Self::NothingToVerify => "verify.nothing_to_verify",
        })
    }
}
