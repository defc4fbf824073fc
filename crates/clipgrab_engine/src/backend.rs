use clipgrab_core::{MediaPayload, Metadata, BLANK_URL_ERROR};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use session_logging::{session_debug, session_info, session_warn};
use url::Url;

use crate::{ClientSettings, WorkflowError};

/// The extraction backend, as far as the workflow is concerned.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `GET {base}/metadata?url=...`
    async fn metadata(&self, url: &str) -> Result<Metadata, WorkflowError>;

    /// `POST {base}/download` with `{"url": ...}`; returns the media bytes.
    async fn download(&self, url: &str) -> Result<MediaPayload, WorkflowError>;
}

/// Wire shape of the metadata record. The backend has shipped both key styles.
#[derive(Debug, Deserialize)]
struct MetadataRecord {
    #[serde(rename = "Title", alias = "title", default)]
    title: String,
    #[serde(rename = "Thumbnail", alias = "thumbnail", default)]
    thumbnail: Option<String>,
    #[serde(
        rename = "OriginalURL",
        alias = "original_url",
        alias = "originalUrl",
        default
    )]
    original_url: Option<String>,
}

impl MetadataRecord {
    fn into_metadata(self, requested_url: &str) -> Metadata {
        Metadata {
            title: self.title,
            thumbnail_url: self.thumbnail.filter(|thumb| !thumb.trim().is_empty()),
            original_url: self
                .original_url
                .filter(|original| !original.trim().is_empty())
                .unwrap_or_else(|| requested_url.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ClientSettings,
    client: reqwest::Client,
    base: Url,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, WorkflowError> {
        let base = Url::parse(settings.backend_base.trim_end_matches('/'))
            .map_err(|err| WorkflowError::Config(format!("{}: {err}", settings.backend_base)))?;
        if base.cannot_be_a_base() {
            return Err(WorkflowError::Config(settings.backend_base.clone()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            settings,
            client,
            base,
        })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut endpoint = self.base.clone();
        // `cannot_be_a_base` was ruled out in `new`.
        if let Ok(mut segments) = endpoint.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        endpoint
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn metadata(&self, url: &str) -> Result<Metadata, WorkflowError> {
        let url = require_url(url)?;
        let mut endpoint = self.endpoint("metadata");
        endpoint.query_pairs_mut().append_pair("url", url);
        session_debug!("GET {}", endpoint);

        let response = self.client.get(endpoint).send().await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        let record: MetadataRecord = serde_json::from_slice(&body)
            .map_err(|err| WorkflowError::Decode(err.to_string()))?;
        let metadata = record.into_metadata(url);
        session_info!("Resolved metadata title={:?}", metadata.title);
        Ok(metadata)
    }

    async fn download(&self, url: &str) -> Result<MediaPayload, WorkflowError> {
        let url = require_url(url)?;
        let endpoint = self.endpoint("download");
        let body = serde_json::to_vec(&DownloadRequest { url })
            .map_err(|err| WorkflowError::Decode(err.to_string()))?;
        session_debug!("POST {} body_len={}", endpoint, body.len());

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let max_bytes = self.settings.max_payload_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(WorkflowError::TooLarge {
                    max_bytes,
                    actual: content_len,
                });
            }
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(WorkflowError::TooLarge {
                    max_bytes,
                    actual: next_len,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        session_info!("Fetched payload bytes={}", bytes.len());
        Ok(MediaPayload::new(bytes, mime_type.as_deref()))
    }
}

fn require_url(url: &str) -> Result<&str, WorkflowError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(BLANK_URL_ERROR.to_string()));
    }
    Ok(trimmed)
}

/// Turns a non-2xx response into `Error {status}: {body}`.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, WorkflowError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(text) => text.trim_end().to_string(),
        Err(err) => {
            session_warn!("Could not read error body for status {}: {}", status, err);
            String::new()
        }
    };
    session_warn!("Backend answered {}: {}", status.as_u16(), body);
    Err(WorkflowError::Http {
        status: status.as_u16(),
        body,
    })
}
