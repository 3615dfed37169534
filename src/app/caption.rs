use tracing::{info, warn};

use crate::config::Config;
use crate::http;

pub(crate) const TEMPLATE_DELIMITER: char = '|';
const TEMPLATE_SEPARATOR: &str = "\n.\n.\n.\n.\n.\n";
const FALLBACK_HASHTAGS: &str = "#Physics #Science";
const SYNTHESIZED_HASHTAGS: &str = "#Physics #Science #Education";

/// How the model's reply is turned into the final caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStyle {
    /// The reply is used unchanged.
    Plain,
    /// The reply is split into a hook and hashtags and laid out with dot
    /// separator lines between them.
    Templated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptionSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone)]
pub(crate) struct Caption {
    pub(crate) text: String,
    pub(crate) source: CaptionSource,
}

/// `"Newtons_Third_Law.mp4"` becomes `"Newtons Third Law"`.
pub(crate) fn derive_topic(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn build_prompt(topic: &str, style: CaptionStyle) -> String {
    match style {
        CaptionStyle::Plain => format!(
            "Write a short, engaging Instagram caption for a physics video about '{topic}'. \
             Include 3-4 interesting facts and SEO hashtags like #Physics #Science #Education. \
             Keep it exciting for students."
        ),
        CaptionStyle::Templated => format!(
            "Write one catchy hook sentence for a physics video about '{topic}' that makes \
             students want to watch. Then write the character '{TEMPLATE_DELIMITER}' followed by \
             6 to 10 SEO hashtags such as #Physics #Science #Education. \
             Reply with the hook, the '{TEMPLATE_DELIMITER}' and the hashtags only."
        ),
    }
}

/// `#NewtonsThirdLaw #Physics #Science #Education` for topic `Newtons Third Law`.
pub(crate) fn synthesize_hashtags(topic: &str) -> String {
    let topic_tag = topic
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .collect::<String>();
    if topic_tag.is_empty() {
        SYNTHESIZED_HASHTAGS.to_string()
    } else {
        format!("#{topic_tag} {SYNTHESIZED_HASHTAGS}")
    }
}

pub(crate) fn assemble_template(hook: &str, hashtags: &str) -> String {
    format!("{hook}{TEMPLATE_SEPARATOR}{hashtags}")
}

fn fallback_hook(topic: &str) -> String {
    format!("Check out this amazing Physics video on {topic}! 🚀")
}

impl CaptionStyle {
    /// Post-processes a model reply. `raw` must be non-blank.
    pub(crate) fn format(self, raw: &str, topic: &str) -> String {
        let raw = raw.trim();
        match self {
            CaptionStyle::Plain => raw.to_string(),
            CaptionStyle::Templated => {
                let (hook, hashtags) = match raw.split_once(TEMPLATE_DELIMITER) {
                    Some((hook, hashtags)) => (hook.trim(), hashtags.trim()),
                    None => (raw, ""),
                };
                let hook = if hook.is_empty() {
                    fallback_hook(topic)
                } else {
                    hook.to_string()
                };
                let hashtags = if hashtags.is_empty() {
                    synthesize_hashtags(topic)
                } else {
                    hashtags.to_string()
                };
                assemble_template(&hook, &hashtags)
            }
        }
    }

    pub(crate) fn fallback(self, topic: &str) -> String {
        match self {
            CaptionStyle::Plain => format!("{} {FALLBACK_HASHTAGS}", fallback_hook(topic)),
            CaptionStyle::Templated => assemble_template(&fallback_hook(topic), FALLBACK_HASHTAGS),
        }
    }
}

pub(crate) struct CaptionGenerator {
    agent: ureq::Agent,
    base_url: String,
    style: CaptionStyle,
}

impl CaptionGenerator {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(config.request_timeout),
            base_url: config.endpoints.caption.clone(),
            style: config.caption_style,
        }
    }

    pub(crate) fn request_url(&self, prompt: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(prompt))
    }

    /// Never fails: any problem with the endpoint yields the fallback caption.
    pub(crate) fn generate(&self, file_name: &str) -> Caption {
        let topic = derive_topic(file_name);
        let url = self.request_url(&build_prompt(&topic, self.style));

        let failure = match http::get_text(&self.agent, &url) {
            Ok(response) if response.is_ok() && !response.body.trim().is_empty() => {
                info!(topic = %topic, "caption generated");
                return Caption {
                    text: self.style.format(&response.body, &topic),
                    source: CaptionSource::Generated,
                };
            }
            Ok(response) if response.is_ok() => "empty response body".to_string(),
            Ok(response) => format!("HTTP status {}", response.status),
            Err(err) => err.to_string(),
        };

        warn!(topic = %topic, error = %failure, "caption generation failed, using fallback");
        Caption {
            text: self.style.fallback(&topic),
            source: CaptionSource::Fallback,
        }
    }
}
