use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "reelcast",
    version,
    about = "Upload one local video, caption it, and broadcast the link"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub options: Options,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process the next eligible video (default).
    Run {
        /// Select and caption without uploading, broadcasting, or marking the video consumed.
        #[arg(long)]
        dry_run: bool,
    },
    /// List videos that are still eligible, in selection order.
    Pending,
    /// List file names recorded in the history file.
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaptionStyleArg {
    Plain,
    Templated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionArg {
    History,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WebhookPayloadArg {
    Announcement,
    Caption,
}

#[derive(Debug, Clone, Args)]
pub struct Options {
    #[arg(long, global = true, env = "REELCAST_VIDEO_DIR", default_value = "content/video")]
    pub video_dir: PathBuf,

    #[arg(long, global = true, env = "REELCAST_HISTORY_FILE", default_value = "history.txt")]
    pub history_file: PathBuf,

    /// Recognized media extensions, without the leading dot.
    #[arg(
        long,
        global = true,
        env = "REELCAST_EXTENSIONS",
        value_delimiter = ',',
        default_values = ["mp4", "mkv", "mov"]
    )]
    pub extensions: Vec<String>,

    #[arg(long, global = true, value_enum, env = "REELCAST_CAPTION_STYLE", default_value = "templated")]
    pub caption_style: CaptionStyleArg,

    #[arg(long, global = true, value_enum, env = "REELCAST_COMPLETION", default_value = "delete")]
    pub completion: CompletionArg,

    #[arg(
        long,
        global = true,
        value_enum,
        env = "REELCAST_WEBHOOK_PAYLOAD",
        default_value = "announcement"
    )]
    pub webhook_payload: WebhookPayloadArg,

    #[arg(long, global = true, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    #[arg(long, global = true, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    #[arg(long, global = true, env = "WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    #[arg(long, global = true, env = "CATBOX_USERHASH", hide_env_values = true)]
    pub catbox_userhash: Option<String>,

    #[arg(
        long,
        global = true,
        env = "REELCAST_UPLOAD_URL",
        default_value = "https://catbox.moe/user/api.php"
    )]
    pub upload_url: String,

    #[arg(
        long,
        global = true,
        env = "REELCAST_CAPTION_URL",
        default_value = "https://text.pollinations.ai"
    )]
    pub caption_url: String,

    #[arg(
        long,
        global = true,
        env = "REELCAST_TELEGRAM_API_BASE",
        default_value = "https://api.telegram.org"
    )]
    pub telegram_api_base: String,

    #[arg(long, global = true, env = "REELCAST_UPLOAD_TIMEOUT_SECS", default_value_t = 60)]
    pub upload_timeout_secs: u64,

    /// Timeout for caption and broadcast requests.
    #[arg(long, global = true, env = "REELCAST_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}
