mod broadcast;
mod caption;
mod completion;
mod history;
mod selector;
mod upload;


use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::cli::{Cli, Command};
use crate::config::Config;

pub use self::broadcast::WebhookPayload;
pub use self::caption::CaptionStyle;
pub use self::completion::CompletionStrategy;

use self::broadcast::{BroadcastReport, Broadcaster};
use self::caption::{Caption, CaptionGenerator};
use self::history::{read_history, used_names};
use self::selector::{Video, scan_candidates, select_video};
use self::upload::Uploader;

/// Terminal state of one invocation.
#[derive(Debug)]
pub(crate) enum RunOutcome {
    NoCandidates,
    UploadFailed {
        video: Video,
        error: String,
    },
    DryRun {
        video: Video,
        caption: Caption,
    },
    Posted {
        video: Video,
        url: String,
        caption: Caption,
        report: BroadcastReport,
    },
}

impl RunOutcome {
    pub(crate) fn exit_status(&self) -> u8 {
        match self {
            RunOutcome::UploadFailed { .. } => 1,
            RunOutcome::NoCandidates | RunOutcome::DryRun { .. } | RunOutcome::Posted { .. } => 0,
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_options(&cli.options)?;

    match cli.command {
        Some(Command::Run { dry_run }) => run_once(&config, dry_run),
        None => run_once(&config, false),
        Some(Command::Pending) => run_pending(&config),
        Some(Command::History) => run_history(&config),
    }
}

fn run_once(config: &Config, dry_run: bool) -> Result<ExitCode> {
    let outcome = execute(config, dry_run)?;
    match &outcome {
        RunOutcome::NoCandidates => println!("No new videos available to post."),
        RunOutcome::UploadFailed { video, error } => {
            println!("Failed to upload {}: {error}", video.file_name);
        }
        RunOutcome::DryRun { video, caption } => {
            println!("Would post: {}", video.file_name);
            println!("Caption:\n{}", caption.text);
        }
        RunOutcome::Posted {
            video,
            url,
            report,
            ..
        } => {
            println!("Posted {} -> {url}", video.file_name);
            println!("Broadcast {}", report.summary());
        }
    }
    Ok(ExitCode::from(outcome.exit_status()))
}

/// Runs scan, upload, caption, broadcast and completion for at most one video.
///
/// Upload failure ends the run with the file untouched. Caption and broadcast
/// problems are absorbed; completion runs whatever the broadcast reported.
pub(crate) fn execute(config: &Config, dry_run: bool) -> Result<RunOutcome> {
    let used = used_names(&read_history(&config.history_file)?);
    let Some(video) = select_video(&config.video_dir, &config.extensions, &used)? else {
        info!(dir = %config.video_dir.display(), "no new videos available to post");
        return Ok(RunOutcome::NoCandidates);
    };
    info!(file = %video.file_name, "processing video");

    if dry_run {
        let caption = CaptionGenerator::new(config).generate(&video.file_name);
        return Ok(RunOutcome::DryRun { video, caption });
    }

    let url = match Uploader::new(config).upload(&video) {
        Ok(url) => url,
        Err(err) => {
            error!(file = %video.file_name, error = %err, "failed to upload video, leaving it for the next run");
            return Ok(RunOutcome::UploadFailed {
                video,
                error: err.to_string(),
            });
        }
    };
    info!(url = %url, "uploaded video");

    let caption = CaptionGenerator::new(config).generate(&video.file_name);
    info!(source = ?caption.source, caption = %caption.text, "caption ready");

    let report = Broadcaster::new(config).broadcast(&url, &caption.text);

    config
        .completion
        .complete(&video, &config.history_file)
        .with_context(|| format!("posted {} but could not mark it as used", video.file_name))?;

    Ok(RunOutcome::Posted {
        video,
        url,
        caption,
        report,
    })
}

/// A video that the next run could pick, with the topic its caption will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingRow {
    pub(crate) file_name: String,
    pub(crate) topic: String,
}

pub(crate) fn pending_rows(config: &Config) -> Result<Vec<PendingRow>> {
    let used = used_names(&read_history(&config.history_file)?);
    let candidates = scan_candidates(&config.video_dir, &config.extensions, &used)?;
    Ok(candidates
        .into_iter()
        .map(|video| PendingRow {
            topic: caption::derive_topic(&video.file_name),
            file_name: video.file_name,
        })
        .collect())
}

pub(crate) fn history_rows(config: &Config) -> Result<Vec<String>> {
    read_history(&config.history_file)
}

fn run_pending(config: &Config) -> Result<ExitCode> {
    let rows = pending_rows(config)?;
    if rows.is_empty() {
        println!("No videos waiting in {}.", config.video_dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<4} {:<48} {:<30}", "#", "FILE", "TOPIC");
    for (idx, row) in rows.iter().enumerate() {
        println!(
            "{:<4} {:<48} {:<30}",
            idx + 1,
            truncate(&row.file_name, 48),
            truncate(&row.topic, 30)
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_history(config: &Config) -> Result<ExitCode> {
    let entries = history_rows(config)?;
    if entries.is_empty() {
        println!(
            "No videos recorded in {} yet.",
            config.history_file.display()
        );
        return Ok(ExitCode::SUCCESS);
    }
    for entry in entries {
        println!("{entry}");
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
