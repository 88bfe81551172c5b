//! HTTP client implementation

use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::DeployerError;

/// Shared client for artifact downloads and webhook delivery
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, DeployerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pushgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// GET a resource and return its body; non-2xx answers are errors
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, DeployerError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET failed: {} - {}", status, body);
            return Err(DeployerError::UpstreamError(format!("{}: {}", status, body)));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// POST a JSON body and report the answer's status
    pub async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<StatusCode, DeployerError> {
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        Ok(response.status())
    }
}
