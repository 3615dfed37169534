use multipart::client::lazy::Multipart;
use tracing::{debug, info};

use super::selector::Video;
use crate::config::Config;
use crate::http::{self, HttpError};

#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("upload request failed: {0}")]
    Http(#[from] HttpError),
    #[error("upload returned HTTP {status} instead of 200 ({body})")]
    UnexpectedStatus { status: u16, body: String },
    #[error("upload response did not contain a URL")]
    EmptyBody,
}

/// Posts a file to a Catbox-compatible host and returns its public URL.
pub(crate) struct Uploader {
    agent: ureq::Agent,
    endpoint: String,
    userhash: Option<String>,
}

impl Uploader {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(config.upload_timeout),
            endpoint: config.endpoints.upload.clone(),
            userhash: config.userhash.clone(),
        }
    }

    pub(crate) fn upload(&self, video: &Video) -> Result<String, UploadError> {
        let mut form = Multipart::new();
        form.add_text("reqtype", "fileupload")
            .add_text("userhash", self.userhash.as_deref().unwrap_or_default())
            .add_file("fileToUpload", video.path.as_path());
        // Opens the file; its bytes are read while the request body is sent.
        let body = form.prepare().map_err(|err| UploadError::Io {
            path: video.path.display().to_string(),
            source: err.error,
        })?;
        let content_type = format!("multipart/form-data; boundary={}", body.boundary());
        let content_length = body.content_len();

        info!(file = %video.file_name, bytes = ?content_length, "uploading video");
        let response = http::post_stream(
            &self.agent,
            &self.endpoint,
            &content_type,
            content_length,
            body,
        )?;

        if !response.is_ok() {
            return Err(UploadError::UnexpectedStatus {
                status: response.status,
                body: response.body.trim().chars().take(240).collect(),
            });
        }

        let url = response.body.trim();
        if url.is_empty() {
            return Err(UploadError::EmptyBody);
        }
        debug!(url, "upload accepted");
        Ok(url.to_string())
    }
}
