use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::history::append_history;
use super::selector::Video;

/// How a posted video is taken out of the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStrategy {
    /// Keep the file and record its name in the history file.
    History,
    /// Remove the file from disk.
    Delete,
}

impl CompletionStrategy {
    pub(crate) fn complete(self, video: &Video, history_file: &Path) -> Result<()> {
        match self {
            CompletionStrategy::History => {
                append_history(history_file, &video.file_name)?;
                info!(file = %video.file_name, history = %history_file.display(), "history updated");
            }
            CompletionStrategy::Delete => {
                fs::remove_file(&video.path).with_context(|| {
                    format!("failed to delete posted video {}", video.path.display())
                })?;
                info!(file = %video.file_name, "video deleted");
            }
        }
        Ok(())
    }
}
