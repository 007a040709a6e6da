use serde::{Deserialize, Serialize};

use modsync_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod provider;
pub mod verify;

pub use download::DownloadEvent;
pub use general::GeneralEvent;
pub use provider::ProviderEvent;
pub use verify::VerifyEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors, debug output and operation lifecycle
    General(GeneralEvent),

    /// Module-to-provider resolution and manifest fetching
    Provider(ProviderEvent),

    /// File downloads
    Download(DownloadEvent),

    /// Integrity verification
    Verify(VerifyEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Provider(ProviderEvent::ManifestFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Provider(ProviderEvent::Missing { .. })
            | Self::Download(DownloadEvent::HashUnavailable { .. })
            | Self::Verify(VerifyEvent::FileMismatch { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Provider(ProviderEvent::Resolved { .. })
            | Self::Download(DownloadEvent::Started { .. })
            | Self::Verify(VerifyEvent::ModuleStarted { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "modsync::events::general",
            Self::Provider(_) => "modsync::events::provider",
            Self::Download(_) => "modsync::events::download",
            Self::Verify(_) => "modsync::events::verify",
        }
    }
}
