use std::io::{ErrorKind, Read};
use std::time::Duration;

use serde::Serialize;

const ERROR_BODY_PREVIEW_CHARS: usize = 240;

#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpError {
    #[error("HTTP status {status}{}", preview_suffix(.body))]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("request encode failed: {0}")]
    Encode(String),
}

fn preview_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        let truncated = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>();
        format!(" ({truncated})")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl TextResponse {
    pub(crate) fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Every socket operation (connect, each read, each write) gets `timeout` on
/// its own. A transfer that keeps moving is never cut off by a total deadline.
pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .build()
}

pub(crate) fn get_text(agent: &ureq::Agent, url: &str) -> Result<TextResponse, HttpError> {
    into_text(agent.get(url).call())
}

pub(crate) fn post_json<T: Serialize>(
    agent: &ureq::Agent,
    url: &str,
    body: &T,
) -> Result<TextResponse, HttpError> {
    let value = serde_json::to_value(body).map_err(|err| HttpError::Encode(err.to_string()))?;
    into_text(agent.post(url).send_json(value))
}

/// Streams `reader` as the request body. With a known length the payload goes
/// out with `Content-Length` instead of chunked encoding.
pub(crate) fn post_stream(
    agent: &ureq::Agent,
    url: &str,
    content_type: &str,
    content_length: Option<u64>,
    reader: impl Read,
) -> Result<TextResponse, HttpError> {
    let mut request = agent.post(url).set("Content-Type", content_type);
    if let Some(len) = content_length {
        request = request.set("Content-Length", &len.to_string());
    }
    into_text(request.send(reader))
}

fn into_text(result: Result<ureq::Response, ureq::Error>) -> Result<TextResponse, HttpError> {
    match result {
        Ok(response) => {
            let status = response.status();
            match response.into_string() {
                Ok(body) => Ok(TextResponse { status, body }),
                Err(err) if err.kind() == ErrorKind::InvalidData => {
                    Err(HttpError::Decode(err.to_string()))
                }
                Err(err) => Err(HttpError::Transport(err.to_string())),
            }
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().ok().unwrap_or_default();
            Err(HttpError::Status { status, body })
        }
        Err(ureq::Error::Transport(err)) => Err(HttpError::Transport(err.to_string())),
    }
}
