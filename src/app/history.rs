use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Names recorded in the history file, oldest first. A missing file reads as
/// empty; an unreadable one is an error so a used video is never offered again.
pub(crate) fn read_history(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(parse_history(&raw)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read history file {}", path.display())),
    }
}

/// One exact file name per line. Only the line ending is stripped, since a name
/// may itself start or end with spaces and must match the directory entry.
pub(crate) fn parse_history(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

pub(crate) fn used_names(entries: &[String]) -> HashSet<String> {
    entries.iter().cloned().collect()
}

pub(crate) fn append_history(path: &Path, file_name: &str) -> Result<()> {
    if file_name.contains(['\n', '\r']) {
        bail!("cannot record file name containing a line break: {file_name:?}");
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create history directory {}", parent.display())
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;
    writeln!(file, "{file_name}")
        .with_context(|| format!("failed to append to history file {}", path.display()))?;
    Ok(())
}
