//! Download/installation error types

use std::borrow::Cow;

use crate::{Error, UserFacingError};

#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum InstallError {
    #[error("{path}: {source}")]
    FileFailed {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("download task failed: {message}")]
    TaskError { message: String },

    #[error("no files to download for the requested modules")]
    NothingToDownload,
}

impl InstallError {
    /// Attach the failing file's path to an error
    pub fn file_failed(path: impl Into<String>, source: impl Into<Error>) -> Self {
        Self::FileFailed {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::FileFailed { source, .. } => source.user_hint(),
            Self::NothingToDownload => Some("Check the module names passed with `--modules`."),
            Self::TaskError { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::FileFailed { source, .. } => source.is_retryable(),
            Self::TaskError { .. } => true,
            Self::NothingToDownload => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::FileFailed { source, .. } => source.user_code(),
            Self::TaskError { .. } => Some("install.task_error"),
            Self::NothingToDownload => Some("install.nothing_to_download"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkError;
    use std::error::Error as _;

    #[test]
    fn file_failure_names_path_and_keeps_source() {
        let err = InstallError::file_failed(
            "modules/js-module/libnode.so",
            NetworkError::HttpError {
                status: 404,
                url: "https://cdn.example/libnode.so".to_string(),
            },
        );

        assert!(err.to_string().starts_with("modules/js-module/libnode.so: "));
        assert!(err.source().is_some());
        assert_eq!(err.user_code(), Some("network.http_error"));
        assert!(!err.is_retryable());
    }
}
