use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::app::{CaptionStyle, CompletionStrategy, WebhookPayload};
use crate::cli::{CaptionStyleArg, CompletionArg, Options, WebhookPayloadArg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub upload: String,
    pub caption: String,
    pub telegram_api_base: String,
}

/// Settings for a single invocation, resolved once from flags and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub video_dir: PathBuf,
    pub history_file: PathBuf,
    pub extensions: Vec<String>,
    pub caption_style: CaptionStyle,
    pub completion: CompletionStrategy,
    pub webhook_payload: WebhookPayload,
    pub chat: Option<ChatTarget>,
    pub webhook_url: Option<String>,
    pub userhash: Option<String>,
    pub endpoints: Endpoints,
    pub upload_timeout: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_options(options: &Options) -> Result<Self> {
        let extensions = normalize_extensions(&options.extensions);
        if extensions.is_empty() {
            bail!("at least one media extension must be configured");
        }
        if options.upload_timeout_secs == 0 || options.request_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }

        let userhash = non_empty(options.catbox_userhash.as_deref());
        if userhash
            .as_deref()
            .is_some_and(|hash| hash.chars().any(char::is_control))
        {
            bail!("catbox userhash must not contain control characters");
        }

        let chat = match (
            non_empty(options.bot_token.as_deref()),
            non_empty(options.chat_id.as_deref()),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(ChatTarget { bot_token, chat_id }),
            _ => None,
        };

        Ok(Self {
            video_dir: options.video_dir.clone(),
            history_file: options.history_file.clone(),
            extensions,
            caption_style: match options.caption_style {
                CaptionStyleArg::Plain => CaptionStyle::Plain,
                CaptionStyleArg::Templated => CaptionStyle::Templated,
            },
            completion: match options.completion {
                CompletionArg::History => CompletionStrategy::History,
                CompletionArg::Delete => CompletionStrategy::Delete,
            },
            webhook_payload: match options.webhook_payload {
                WebhookPayloadArg::Announcement => WebhookPayload::Announcement,
                WebhookPayloadArg::Caption => WebhookPayload::CaptionAsContent,
            },
            chat,
            webhook_url: non_empty(options.webhook_url.as_deref()),
            userhash,
            endpoints: Endpoints {
                upload: options.upload_url.trim().to_string(),
                caption: options.caption_url.trim().trim_end_matches('/').to_string(),
                telegram_api_base: options
                    .telegram_api_base
                    .trim()
                    .trim_end_matches('/')
                    .to_string(),
            },
            upload_timeout: Duration::from_secs(options.upload_timeout_secs),
            request_timeout: Duration::from_secs(options.request_timeout_secs),
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}
