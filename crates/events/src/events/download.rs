use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Download pipeline events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    BatchStarted {
        files: usize,
        total_bytes: Option<u64>,
        concurrency: usize,
    },

    Started {
        module: String,
        path: String,
        url: String,
        total_size: Option<u64>,
    },

    Completed {
        module: String,
        path: String,
        final_size: u64,
        hash: String,
    },

    /// No digest is published for this file; content is not checked
    HashUnavailable { module: String, path: String },

    Failed {
        module: String,
        path: String,
        failure: FailureContext,
    },

    BatchCompleted {
        succeeded: usize,
        failed: usize,
        cancelled: bool,
    },
}
