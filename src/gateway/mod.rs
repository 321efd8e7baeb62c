use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod transport;

pub use transport::{HttpReply, ReqwestTransport, TransportError};

use crate::{ClientError, Result};

pub const TRANSCRIPT_PATH: &str = "api/transcript";
pub const FORMAT_PATH: &str = "api/format";
pub const MODELS_PATH: &str = "static/models.md";

pub const MISSING_URL: &str = "Please enter a YouTube URL";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
const FETCH_FAILED: &str = "Failed to fetch transcript";
const FORMAT_FAILED: &str = "Failed to format transcript";

/// HTTP plumbing the gateway talks through. Paths are relative to the backend base URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the raw reply
    async fn post_json(&self, path: &str, body: serde_json::Value) -> std::result::Result<HttpReply, TransportError>;

    /// GET a text resource
    async fn get_text(&self, path: &str) -> std::result::Result<HttpReply, TransportError>;
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    youtube_url: &'a str,
}

#[derive(Debug, Serialize)]
struct FormatRequest<'a> {
    raw_transcript: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    success: bool,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormatResponse {
    success: bool,
    #[serde(default)]
    formatted_transcript: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Issues the backend calls and normalizes their outcomes into [`ClientError`]s
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Request the raw transcript for a video URL
    pub async fn fetch_transcript(&self, youtube_url: &str) -> Result<String> {
        let youtube_url = youtube_url.trim();
        if youtube_url.is_empty() {
            return Err(ClientError::Validation(MISSING_URL.to_string()));
        }

        tracing::info!("Requesting transcript for URL: {}", youtube_url);

        let body = to_body(&TranscriptRequest { youtube_url })?;
        let reply = self.post(TRANSCRIPT_PATH, body).await?;
        let response: TranscriptResponse = decode(&reply, FETCH_FAILED)?;

        match (response.success, response.transcript) {
            (true, Some(transcript)) => Ok(transcript),
            (true, None) => {
                tracing::error!("Transcript response reported success without a transcript");
                Err(ClientError::Network(NETWORK_ERROR.to_string()))
            }
            (false, _) => Err(remote_error(response.error, FETCH_FAILED)),
        }
    }

    /// Ask the backend to reformat a raw transcript with `model`.
    /// The API key is sent only when one is given.
    pub async fn format_transcript(
        &self,
        raw_transcript: &str,
        model: &str,
        api_key: Option<&str>,
    ) -> Result<String> {
        if raw_transcript.is_empty() {
            return Err(ClientError::Validation(
                "No transcript available to format".to_string(),
            ));
        }

        tracing::info!("Requesting formatting with model: {}", model);

        let body = to_body(&FormatRequest {
            raw_transcript,
            model,
            api_key: api_key.filter(|key| !key.is_empty()),
        })?;
        let reply = self.post(FORMAT_PATH, body).await?;
        let response: FormatResponse = decode(&reply, FORMAT_FAILED)?;

        match (response.success, response.formatted_transcript) {
            (true, Some(formatted)) => Ok(formatted),
            (true, None) => {
                tracing::error!("Format response reported success without a formatted transcript");
                Err(ClientError::Network(NETWORK_ERROR.to_string()))
            }
            (false, _) => Err(remote_error(response.error, FORMAT_FAILED)),
        }
    }

    /// Fetch the line-oriented model list resource
    pub async fn fetch_model_list(&self) -> Result<String> {
        let reply = self.transport.get_text(MODELS_PATH).await.map_err(|e| {
            tracing::warn!("Failed to load models: {}", e);
            ClientError::Network(NETWORK_ERROR.to_string())
        })?;

        if !reply.is_success() {
            tracing::warn!("Failed to load models: HTTP {}", reply.status);
            return Err(ClientError::Remote(format!(
                "Failed to load models: HTTP {}",
                reply.status
            )));
        }

        Ok(reply.body)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<HttpReply> {
        self.transport.post_json(path, body).await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", path, e);
            ClientError::Network(NETWORK_ERROR.to_string())
        })
    }
}

fn to_body<T: Serialize>(request: &T) -> Result<serde_json::Value> {
    serde_json::to_value(request).map_err(|e| {
        tracing::error!("Failed to encode request: {}", e);
        ClientError::Network(NETWORK_ERROR.to_string())
    })
}

/// Parse a JSON reply. An unreadable body is a connectivity problem on a 2xx
/// reply and a plain remote failure otherwise.
fn decode<T: serde::de::DeserializeOwned>(reply: &HttpReply, fallback: &str) -> Result<T> {
    match serde_json::from_str(&reply.body) {
        Ok(parsed) => Ok(parsed),
        Err(e) if reply.is_success() => {
            tracing::error!("Malformed response body: {}", e);
            Err(ClientError::Network(NETWORK_ERROR.to_string()))
        }
        Err(_) => {
            tracing::error!("Backend responded with HTTP {}", reply.status);
            Err(ClientError::Remote(fallback.to_string()))
        }
    }
}

fn remote_error(message: Option<String>, fallback: &str) -> ClientError {
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    tracing::warn!("Backend reported failure: {}", message);
    ClientError::Remote(message)
}
