use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{looks_like_reference, ReferenceProvider};

/// Downloads reference tracks from direct URLs
#[derive(Debug, Clone)]
pub struct HttpReferenceProvider {
    /// HTTP client for making requests
    client: Client,
}

impl HttpReferenceProvider {
    /// Create a client whose requests give up after `timeout_secs`
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Only absolute http(s) URLs are accepted as descriptors
    pub fn parse_descriptor(descriptor: &str) -> Result<Url, ProviderError> {
        let url = Url::parse(descriptor.trim())
            .map_err(|e| ProviderError::InvalidDescriptor(format!("{}: {}", descriptor, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ProviderError::InvalidDescriptor(format!(
                "{}: unsupported scheme {}",
                descriptor, other
            ))),
        }
    }
}

#[async_trait]
impl ReferenceProvider for HttpReferenceProvider {
    async fn fetch_reference(&self, episode: &str, descriptor: &str) -> Result<Option<String>, ProviderError> {
        let url = Self::parse_descriptor(descriptor)?;
        debug!("[{}] downloading reference from {}", episode, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("[{}] reference download failed ({}): {}", episode, status, error_text);
            return Err(ProviderError::ApiError { status_code: status.as_u16(), message: error_text });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read body of {}: {}", url, e)))?;

        if !looks_like_reference(&body) {
            return Err(ProviderError::InvalidBody(url.to_string()));
        }

        Ok(Some(body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
