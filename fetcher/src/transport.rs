//! The network boundary of a fetcher.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::error::FetchError;

/// A fully resolved request, with default headers already merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

/// A received response, before status checks or parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends a request and returns whatever response came back.
///
/// Implementations return `Err` only when no response was received; status
/// codes are judged by the fetcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: FetchRequest,
    ) -> Result<FetchResponse, FetchError>;
}

/// [`Transport`] over a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    inner_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(inner_client: reqwest::Client) -> Self {
        Self { inner_client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(
        &self,
        request: FetchRequest,
    ) -> Result<FetchResponse, FetchError> {
        let response = self
            .inner_client
            .request(request.method, &request.url)
            .headers(request.headers)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        tracing::debug!(%status, bytes = body.len(), "received response");
        Ok(FetchResponse { status, body })
    }
}
