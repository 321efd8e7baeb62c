use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::Transport;

/// Status and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Invalid request path {0}")]
    InvalidPath(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e.to_string())
    }
}

/// [`Transport`] backed by a shared reqwest client
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url`, which should end with `/`
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|_| TransportError::InvalidPath(path.to_string()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<HttpReply, TransportError> {
        let url = self.resolve(path)?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpReply { status, body })
    }

    async fn get_text(&self, path: &str) -> Result<HttpReply, TransportError> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpReply { status, body })
    }
}
