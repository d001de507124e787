//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;
use pareto_model::RequestError;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection.
///
/// Transport failures surface as [`RequestError::Network`]; any response,
/// whatever its status, is returned as-is for the caller to classify.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request, with a bearer token when given
    async fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, RequestError>;

    /// Send a POST request with a JSON body
    async fn post_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, RequestError>;

    /// Send a PUT request with a JSON body
    async fn put_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, RequestError>;

    /// Send a DELETE request
    async fn delete(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, RequestError>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client with an explicit per-request timeout instead of the transport
    /// default
    pub fn with_timeout(timeout: Duration) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::Network(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> Result<HttpResponse, RequestError> {
        tracing::debug!("{} {}", method, url);
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Network(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Network(format!("Reading response body: {}", e)))?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, RequestError> {
        self.send("GET", url, self.client.get(url), token).await
    }

    async fn post_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, RequestError> {
        self.send("POST", url, self.client.post(url).json(body), token)
            .await
    }

    async fn put_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, RequestError> {
        self.send("PUT", url, self.client.put(url).json(body), token)
            .await
    }

    async fn delete(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, RequestError> {
        self.send("DELETE", url, self.client.delete(url), token)
            .await
    }
}
