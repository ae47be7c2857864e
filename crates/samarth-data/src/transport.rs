//! HTTP transport port and its reqwest adapter

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Raw response from one GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level failures; both are retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Port for issuing GET requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(TransportResponse {
            status,
            url: final_url,
            body,
        })
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    // Strip the URL so the api-key never reaches a message
    let error = error.without_url();
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success() {
        let response = TransportResponse::ok("http://localhost/", "{}");
        assert!(response.is_success());
        let failed = TransportResponse {
            status: 503,
            ..response
        };
        assert!(!failed.is_success());
    }
}
