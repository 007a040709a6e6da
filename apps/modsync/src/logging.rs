//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields, at
//! the level [`AppEvent::log_level`] assigns to each event.

use modsync_events::{AppEvent, DownloadEvent, GeneralEvent, ProviderEvent, VerifyEvent};
use tracing::{debug, error, info, warn, Level};

/// Emit `$fields` at a level chosen at runtime
macro_rules! at_level {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            Level::ERROR => error!($($fields)+),
            Level::WARN => warn!($($fields)+),
            Level::INFO => info!($($fields)+),
            _ => debug!($($fields)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();
    let domain = event.log_target();

    match event {
        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::BatchStarted {
                files,
                total_bytes,
                concurrency,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    files = files,
                    total_bytes = ?total_bytes,
                    concurrency = concurrency,
                    "Download batch started"
                );
            }
            DownloadEvent::Started {
                module,
                path,
                url,
                total_size,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    path = %path,
                    url = %url,
                    total_size = ?total_size,
                    "Download started"
                );
            }
            DownloadEvent::Completed {
                module,
                path,
                final_size,
                hash,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    path = %path,
                    final_size = final_size,
                    hash = %hash,
                    "Download completed"
                );
            }
            DownloadEvent::HashUnavailable { module, path } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    path = %path,
                    "No checksum published, content not verified"
                );
            }
            DownloadEvent::Failed {
                module,
                path,
                failure,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    path = %path,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
            DownloadEvent::BatchCompleted {
                succeeded,
                failed,
                cancelled,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    succeeded = succeeded,
                    failed = failed,
                    cancelled = cancelled,
                    "Download batch completed"
                );
            }
        },

        AppEvent::Provider(provider_event) => match provider_event {
            ProviderEvent::Resolved { module, provider } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    provider = %provider,
                    "Provider resolved"
                );
            }
            ProviderEvent::Missing { module } => {
                at_level!(level, domain = domain, module = %module, "No provider for module");
            }
            ProviderEvent::ReleaseSelected {
                module,
                release,
                assets,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    release = %release,
                    assets = assets,
                    "Release selected"
                );
            }
            ProviderEvent::ManifestFetched {
                module,
                provider,
                version,
                build_number,
                files,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    provider = %provider,
                    version = %version,
                    build_number = build_number,
                    files = files,
                    "Manifest fetched"
                );
            }
            ProviderEvent::ManifestFailed { module, failure } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    "Manifest fetch failed"
                );
            }
        },

        AppEvent::Verify(verify_event) => match verify_event {
            VerifyEvent::ManifestsCollected { source, modules } => {
                at_level!(
                    level,
                    domain = domain,
                    source = %source,
                    modules = ?modules,
                    "Manifests collected"
                );
            }
            VerifyEvent::ModuleStarted {
                module,
                source,
                files,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    source = %source,
                    files = files,
                    "Module verification started"
                );
            }
            VerifyEvent::FileMismatch {
                module,
                source,
                path,
                reason,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    source = %source,
                    path = %path,
                    reason = %reason,
                    "File does not match manifest"
                );
            }
            VerifyEvent::ModuleCompleted {
                module,
                source,
                valid,
                failures,
            } => {
                at_level!(
                    level,
                    domain = domain,
                    module = %module,
                    source = %source,
                    valid = valid,
                    failures = failures,
                    "Module verification completed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                at_level!(level, domain = domain, context = ?context, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                at_level!(level, domain = domain, context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                at_level!(level, domain = domain, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                at_level!(
                    level,
                    domain = domain,
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                at_level!(
                    level,
                    domain = domain,
                    operation = %operation,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
        },
    }
}
