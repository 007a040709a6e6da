#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for modsync
//!
//! Errors are grouped by domain (network, provider, manifest, verification,
//! installation, configuration) and unified under [`Error`]. Batch operations
//! that keep going past individual failures report them as an [`ErrorSet`].

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod install;
pub mod manifest;
pub mod network;
pub mod provider;
pub mod set;
pub mod verify;

pub use config::ConfigError;
pub use install::InstallError;
pub use manifest::ManifestError;
pub use network::NetworkError;
pub use provider::ProviderError;
pub use set::ErrorSet;
pub use verify::VerifyError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Multiple(ErrorSet),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self::Io {
            kind: err.kind(),
            message: format!("{}: {err}", path.display()),
            path: Some(path),
        }
    }

    /// Whether this error stopped a run early rather than describing a failed item
    #[must_use]
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Module this error concerns, when it names one
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::Provider(err) => Some(err.module()),
            _ => None,
        }
    }

    /// Iterate over the individual errors, unpacking an [`ErrorSet`]
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Error> + '_> {
        match self {
            Self::Multiple(set) => Box::new(set.iter()),
            other => Box::new(std::iter::once(other)),
        }
    }
}

impl From<ErrorSet> for Error {
    fn from(set: ErrorSet) -> Self {
        Self::Multiple(set)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for modsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Provider(err) => err.user_message(),
            Error::Manifest(err) => err.user_message(),
            Error::Verify(err) => err.user_message(),
            Error::Install(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Provider(err) => err.user_hint(),
            Error::Manifest(err) => err.user_hint(),
            Error::Verify(err) => err.user_hint(),
            Error::Install(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Multiple(set) => set.iter().find_map(UserFacingError::user_hint),
            Error::DeadlineExceeded => Some("Raise `--timeout` or run without a deadline."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Provider(err) => err.is_retryable(),
            Error::Install(err) => err.is_retryable(),
            Error::Multiple(set) => set.iter().all(UserFacingError::is_retryable),
            Error::Io { .. } | Error::DeadlineExceeded => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Provider(err) => err.user_code(),
            Error::Manifest(err) => err.user_code(),
            Error::Verify(err) => err.user_code(),
            Error::Install(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Multiple(_) => Some("error.multiple"),
            Error::Internal(_) => Some("error.internal"),
            Error::Cancelled => Some("error.cancelled"),
            Error::DeadlineExceeded => Some("error.deadline_exceeded"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
