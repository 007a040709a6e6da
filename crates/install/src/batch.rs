//! Bounded concurrent download of a flat file list

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modsync_errors::{Error, ErrorSet, InstallError, VerifyError};
use modsync_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use modsync_hash::Hash;
use modsync_net::{download_file, CancellationToken, NetClient};
use modsync_types::{File, FileKind};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A file that landed on disk and passed its checks
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedFile {
    pub module: String,
    pub path: String,
    pub size: u64,
    pub hash: Hash,
    /// No digest was published, so the content was not checked
    pub unchecked: bool,
}

/// Everything a fully successful batch wrote
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub files: Vec<DownloadedFile>,
    pub bytes: u64,
}

/// Fetch `files` under `root`, at most `parallel` at a time
///
/// Every file is attempted; failures are collected and returned together
/// once all files are done, each tagged with the file's path. Files that
/// fail a checksum or size check stay on disk.
///
/// Tripping `cancel` stops in-flight transfers, aborts the remaining tasks
/// and returns [`Error::Cancelled`] right away.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] on cancellation, a single error when one file
/// failed, or [`Error::Multiple`] when several did.
pub async fn download_all(
    client: &NetClient,
    root: &Path,
    files: Vec<File>,
    parallel: usize,
    cancel: &CancellationToken,
    tx: Option<EventSender>,
) -> Result<DownloadSummary, Error> {
    let batch = Job {
        client: client.clone(),
        root: root.to_path_buf(),
        cancel: cancel.clone(),
        tx,
    };
    let total_bytes = files.iter().map(|file| file.size).sum();
    batch.emit(AppEvent::Download(DownloadEvent::BatchStarted {
        files: files.len(),
        total_bytes,
        concurrency: parallel,
    }));

    let slots = Arc::new(Semaphore::new(parallel.max(1)));
    let mut tasks = JoinSet::new();

    for file in files {
        let job = batch.clone();
        let slots = Arc::clone(&slots);

        tasks.spawn(async move {
            let _permit = tokio::select! {
                biased;
                () = job.cancel.cancelled() => return (file, Err(Error::Cancelled)),
                permit = slots.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return (file, Err(Error::internal("download slots closed"))),
                },
            };
            let result = job.run(&file).await;
            (file, result)
        });
    }

    let mut summary = DownloadSummary::default();
    let mut errors = ErrorSet::new();

    loop {
        let joined = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            joined = tasks.join_next() => match joined {
                Some(joined) => Some(joined),
                None => break,
            },
        };

        let outcome = match joined {
            None => Err(Error::Cancelled),
            Some(Ok((_, Err(e)))) if e.is_interruption() => Err(e),
            Some(Ok((file, Err(e)))) => {
                batch.emit(AppEvent::Download(DownloadEvent::Failed {
                    module: file.module.clone(),
                    path: file.path.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                errors.push(InstallError::file_failed(file.path, e));
                continue;
            }
            Some(Ok((_, Ok(done)))) => {
                summary.bytes += done.size;
                summary.files.push(done);
                continue;
            }
            Some(Err(join_error)) => {
                errors.push(InstallError::TaskError {
                    message: join_error.to_string(),
                });
                continue;
            }
        };

        // Only interruptions reach this point
        tasks.abort_all();
        batch.emit(AppEvent::Download(DownloadEvent::BatchCompleted {
            succeeded: summary.files.len(),
            failed: errors.len(),
            cancelled: true,
        }));
        return outcome;
    }

    batch.emit(AppEvent::Download(DownloadEvent::BatchCompleted {
        succeeded: summary.files.len(),
        failed: errors.len(),
        cancelled: false,
    }));
    errors.into_result().map(|()| summary)
}

/// Shared download context, cloned into every task
#[derive(Clone)]
struct Job {
    client: NetClient,
    root: PathBuf,
    cancel: CancellationToken,
    tx: Option<EventSender>,
}

impl EventEmitter for Job {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Job {
    async fn run(&self, file: &File) -> Result<DownloadedFile, Error> {
        let dest = file.destination(&self.root)?;
        self.emit_download_started(&file.module, &file.path, &file.url, file.size);

        let result = download_file(&self.client, &file.url, &dest, &self.cancel).await?;

        let unchecked = match &file.hash {
            Some(expected) if *expected != result.hash => {
                return Err(VerifyError::ChecksumMismatch {
                    path: file.path.clone(),
                    expected: expected.to_hex(),
                    actual: result.hash.to_hex(),
                }
                .into());
            }
            Some(_) => false,
            None => {
                if file.kind == FileKind::Data {
                    self.emit(AppEvent::Download(DownloadEvent::HashUnavailable {
                        module: file.module.clone(),
                        path: file.path.clone(),
                    }));
                }
                true
            }
        };

        if let Some(expected) = file.size {
            if expected != result.size {
                return Err(VerifyError::SizeMismatch {
                    path: file.path.clone(),
                    expected,
                    actual: result.size,
                }
                .into());
            }
        }

        self.emit_download_completed(&file.module, &file.path, result.size, result.hash.to_hex());
        Ok(DownloadedFile {
            module: file.module.clone(),
            path: file.path.clone(),
            size: result.size,
            hash: result.hash,
            unchecked,
        })
    }
}
