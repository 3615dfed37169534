use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Video {
    pub(crate) file_name: String,
    pub(crate) path: PathBuf,
}

pub(crate) fn has_media_extension(file_name: &str, extensions: &[String]) -> bool {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty() && extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
}

/// Eligible videos in directory-listing order. The order is whatever the
/// filesystem returns and is not sorted.
pub(crate) fn scan_candidates(
    dir: &Path,
    extensions: &[String],
    used: &HashSet<String>,
) -> Result<Vec<Video>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read video directory {}", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list video directory {}", dir.display()))?;
        let Ok(file_name) = entry.file_name().into_string() else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if !has_media_extension(&file_name, extensions) || used.contains(&file_name) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        out.push(Video { path, file_name });
    }
    Ok(out)
}

pub(crate) fn select_video(
    dir: &Path,
    extensions: &[String],
    used: &HashSet<String>,
) -> Result<Option<Video>> {
    Ok(scan_candidates(dir, extensions, used)?.into_iter().next())
}
