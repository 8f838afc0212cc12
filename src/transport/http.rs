use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{IpcError, Result},
    transport::Transport,
};

/// Deadlines applied to every gateway call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connect deadline in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request deadline in seconds
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 60,
        }
    }
}

/// HTTPS transport backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with default deadlines.
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    /// Creates a transport with the given deadlines.
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IpcError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, body: String) -> Result<String> {
        log::debug!("POST {url} ({} bytes)", body.len());

        let response = self
            .client
            .post(url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_err)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_err)?;

        log::debug!("Response status: {status}");
        log::trace!("Response body: {text}");

        if !status.is_success() {
            return Err(IpcError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text.trim().to_owned())
    }
}

fn map_reqwest_err(e: reqwest::Error) -> IpcError {
    if e.is_timeout() {
        IpcError::Timeout(e.to_string())
    } else {
        IpcError::Connection(format!("Error connecting IPC URL: {e}"))
    }
}
