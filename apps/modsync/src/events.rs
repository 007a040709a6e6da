//! Event handling and progress display

use console::{style, Term};
use modsync_events::{AppEvent, DownloadEvent, GeneralEvent, ProviderEvent, VerifyEvent};

use crate::logging::log_event_with_tracing;

/// Turns domain events into status lines on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Suppress status lines; structured logs still go through tracing
    quiet: bool,
    debug_enabled: bool,
    /// Files finished in the current batch
    completed: usize,
    total: usize,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, quiet: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            quiet,
            debug_enabled,
            completed: 0,
            total: 0,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        match event {
            AppEvent::Download(download_event) => self.handle_download(download_event),
            AppEvent::Provider(provider_event) => self.handle_provider(&provider_event),
            AppEvent::Verify(verify_event) => self.handle_verify(&verify_event),
            AppEvent::General(general_event) => self.handle_general(&general_event),
        }
    }

    fn handle_download(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::BatchStarted {
                files, concurrency, ..
            } => {
                self.completed = 0;
                self.total = files;
                self.show_status(&format!(
                    "Downloading {files} files ({concurrency} at a time)"
                ));
            }
            DownloadEvent::Completed { module, path, .. } => {
                self.completed += 1;
                if self.debug_enabled {
                    self.show_status(&format!(
                        "[{}/{}] {module}: {path}",
                        self.completed, self.total
                    ));
                }
            }
            DownloadEvent::HashUnavailable { module, path } => {
                if self.debug_enabled {
                    self.show_warning(&format!("{module}: no checksum published for {path}"));
                }
            }
            DownloadEvent::Failed {
                module,
                path,
                failure,
            } => {
                self.show_error(&format!("{module}: {path}: {}", failure.message));
            }
            DownloadEvent::BatchCompleted {
                succeeded,
                failed,
                cancelled,
            } => {
                if cancelled {
                    self.show_warning(&format!(
                        "Download cancelled after {succeeded} files"
                    ));
                } else if failed > 0 {
                    self.show_error(&format!("{succeeded} files downloaded, {failed} failed"));
                }
            }
            DownloadEvent::Started { .. } => {}
        }
    }

    fn handle_provider(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::Missing { module } => {
                self.show_warning(&format!("No provider serves {module}"));
            }
            ProviderEvent::ReleaseSelected {
                module, release, ..
            } => {
                self.show_status(&format!("{module}: using release {release}"));
            }
            ProviderEvent::ManifestFetched {
                module,
                version,
                build_number,
                ..
            } if self.debug_enabled => {
                self.show_status(&format!("{module}: latest is {version} (build {build_number})"));
            }
            ProviderEvent::ManifestFailed { module, failure } => {
                self.show_error(&format!("{module}: {}", failure.message));
            }
            _ => {}
        }
    }

    fn handle_verify(&self, event: &VerifyEvent) {
        match event {
            VerifyEvent::ManifestsCollected { source, modules } => {
                self.show_status(&format!(
                    "Checking {} {source} manifests",
                    modules.len()
                ));
            }
            VerifyEvent::FileMismatch {
                module,
                source,
                path,
                reason,
            } if self.debug_enabled => {
                self.show_warning(&format!("{module} ({source}): {path}: {reason}"));
            }
            _ => {}
        }
    }

    fn handle_general(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message}: {context}")),
                None => self.show_warning(message),
            },
            GeneralEvent::OperationStarted { operation } if self.debug_enabled => {
                self.show_status(&format!("Starting {operation}"));
            }
            _ => {}
        }
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        if self.quiet {
            return;
        }
        let line = if self.colors_enabled {
            format!("{} {message}", style("•").cyan())
        } else {
            format!("• {message}")
        };
        let _ = self.term.write_line(&line);
    }

    fn show_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let line = if self.colors_enabled {
            format!("{} {message}", style("!").yellow().bold())
        } else {
            format!("! {message}")
        };
        let _ = self.term.write_line(&line);
    }

    /// Errors are shown even in quiet mode
    fn show_error(&self, message: &str) {
        let line = if self.colors_enabled {
            format!("{} {message}", style("✖").red().bold())
        } else {
            format!("✖ {message}")
        };
        let _ = self.term.write_line(&line);
    }
}
