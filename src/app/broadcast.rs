use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ChatTarget, Config};
use crate::http::{self, HttpError, TextResponse};

pub(crate) const ANNOUNCEMENT: &str = "New Physics Video Uploaded!";

/// Shape of the JSON body posted to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookPayload {
    /// `{content: <fixed announcement>, video_url, caption}`
    Announcement,
    /// `{content: <caption>, video_url}`
    CaptionAsContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    Skipped(String),
    Failed(String),
}

impl Delivery {
    fn label(&self) -> String {
        match self {
            Delivery::Delivered => "delivered".to_string(),
            Delivery::Skipped(reason) => format!("skipped ({reason})"),
            Delivery::Failed(reason) => format!("failed ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BroadcastReport {
    pub(crate) chat: Delivery,
    pub(crate) webhook: Delivery,
}

impl BroadcastReport {
    pub(crate) fn summary(&self) -> String {
        format!(
            "chat: {}, webhook: {}",
            self.chat.label(),
            self.webhook.label()
        )
    }
}

#[derive(Debug, Serialize)]
struct SendVideoRequest<'a> {
    chat_id: &'a str,
    video: &'a str,
    caption: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WebhookBody<'a> {
    Announcement {
        content: &'a str,
        video_url: &'a str,
        caption: &'a str,
    },
    CaptionAsContent {
        content: &'a str,
        video_url: &'a str,
    },
}

pub(crate) struct Broadcaster {
    agent: ureq::Agent,
    telegram_api_base: String,
    chat: Option<ChatTarget>,
    webhook_url: Option<String>,
    payload: WebhookPayload,
}

impl Broadcaster {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(config.request_timeout),
            telegram_api_base: config.endpoints.telegram_api_base.clone(),
            chat: config.chat.clone(),
            webhook_url: config.webhook_url.clone(),
            payload: config.webhook_payload,
        }
    }

    /// Best effort: both sinks are attempted and their outcomes reported, never raised.
    pub(crate) fn broadcast(&self, video_url: &str, caption: &str) -> BroadcastReport {
        let report = BroadcastReport {
            chat: self.send_chat(video_url, caption),
            webhook: self.send_webhook(video_url, caption),
        };
        info!(summary = %report.summary(), "broadcast finished");
        report
    }

    fn send_chat(&self, video_url: &str, caption: &str) -> Delivery {
        let Some(target) = &self.chat else {
            info!("chat delivery disabled: bot token or chat id not configured");
            return Delivery::Skipped("bot token or chat id not configured".to_string());
        };

        let url = format!("{}/bot{}/sendVideo", self.telegram_api_base, target.bot_token);
        let body = SendVideoRequest {
            chat_id: &target.chat_id,
            video: video_url,
            caption,
            parse_mode: "Markdown",
        };
        let delivery = delivery_from(http::post_json(&self.agent, &url, &body));
        if let Delivery::Failed(reason) = &delivery {
            let reason = redact(reason, &target.bot_token);
            warn!(error = %reason, "chat delivery failed");
            return Delivery::Failed(reason);
        }
        delivery
    }

    fn send_webhook(&self, video_url: &str, caption: &str) -> Delivery {
        let Some(url) = &self.webhook_url else {
            info!("webhook delivery disabled: no webhook URL configured");
            return Delivery::Skipped("webhook not configured".to_string());
        };

        let body = match self.payload {
            WebhookPayload::Announcement => WebhookBody::Announcement {
                content: ANNOUNCEMENT,
                video_url,
                caption,
            },
            WebhookPayload::CaptionAsContent => WebhookBody::CaptionAsContent {
                content: caption,
                video_url,
            },
        };
        let delivery = delivery_from(http::post_json(&self.agent, url, &body));
        if let Delivery::Failed(reason) = &delivery {
            let reason = redact(reason, url);
            warn!(error = %reason, "webhook delivery failed");
            return Delivery::Failed(reason);
        }
        delivery
    }
}

fn delivery_from(result: Result<TextResponse, HttpError>) -> Delivery {
    match result {
        Ok(response) if (200..300).contains(&response.status) => Delivery::Delivered,
        Ok(response) => Delivery::Failed(format!("HTTP status {}", response.status)),
        Err(err) => Delivery::Failed(err.to_string()),
    }
}

/// Keeps secrets that appear in request URLs out of log lines.
fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        message.to_string()
    } else {
        message.replace(secret, "***")
    }
}
