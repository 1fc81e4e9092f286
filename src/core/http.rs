use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Classification of a single failed HTTP attempt. The caller decides
/// whether to retry based on `is_transient`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection refused or unreachable")]
    ConnectionRefused,

    #[error("server error: HTTP {0}")]
    ServerError(u16),

    #[error("client error: HTTP {0}")]
    ClientError(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Timeouts, connection failures and 5xx are expected to be
    /// retry-recoverable; 4xx and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionRefused | Self::ServerError(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP GET attempt. Retry policy lives with the caller, not here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(format!("ppv/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TransportError::ServerError(status.as_u16()));
        }
        if status.is_client_error() {
            return Err(TransportError::ClientError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionRefused
    } else {
        TransportError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::ConnectionRefused.is_transient());
        assert!(TransportError::ServerError(503).is_transient());
        assert!(!TransportError::ClientError(404).is_transient());
        assert!(!TransportError::Malformed("truncated body".into()).is_transient());
    }

    #[tokio::test]
    async fn get_classifies_server_and_client_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/boom")
            .with_status(502)
            .create_async()
            .await;
        server
            .mock("GET", "/gone")
            .with_status(410)
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();

        let err = client.get(&format!("{}/boom", server.url())).await;
        assert!(matches!(err, Err(TransportError::ServerError(502))));

        let err = client.get(&format!("{}/gone", server.url())).await;
        assert!(matches!(err, Err(TransportError::ClientError(410))));
    }

    #[tokio::test]
    async fn get_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let resp = client.get(&format!("{}/ok", server.url())).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "hello");
    }
}
