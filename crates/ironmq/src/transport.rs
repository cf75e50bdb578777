//! HTTP transport used by queue operations.
//!
//! The queue layer only depends on the [`Transport`] trait: three verbs that
//! take a path relative to the project base URL and return the raw response
//! body. [`HttpTransport`] is the production implementation on top of
//! `reqwest`; tests substitute in-memory doubles.

use crate::config::ClientConfig;
use crate::error::{ConfigurationError, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method};
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// Request/response capability consumed by [`Queue`](crate::queue::Queue)
///
/// Implementations resolve `path` against their own base URL, attach
/// authentication, and return the body of a successful response. Any
/// non-success status must be reported as [`TransportError::Http`] with the
/// status code and raw body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, path: &str) -> Result<String, TransportError>;

    /// Issue a POST request, with a JSON body when one is given
    async fn post(&self, path: &str, body: Option<String>) -> Result<String, TransportError>;

    /// Issue a DELETE request
    async fn delete(&self, path: &str) -> Result<String, TransportError>;
}

/// IronMQ REST transport
///
/// Every request carries `Authorization: OAuth <token>` and JSON content
/// headers. The underlying `reqwest::Client` is cheap to clone and shares
/// its connection pool across clones.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport from client configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the token cannot be
    /// used as a header value, or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url()).map_err(|e| ConfigurationError::Invalid {
            message: format!("invalid base URL: {}", e),
        })?;

        let mut authorization = HeaderValue::from_str(&format!("OAuth {}", config.token))
            .map_err(|_| ConfigurationError::Invalid {
                message: "token contains characters not allowed in a header".to_string(),
            })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL request paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::Connection {
                message: format!("invalid request path '{}': {}", path, e),
            })?;

        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.http_client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request timeout: {}", e)
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                format!("HTTP request failed: {}", e)
            };
            TransportError::Connection { message }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection {
                message: format!("Failed to read response body: {}", e),
            })?;

        if !status.is_success() {
            warn!(method = %method, path, status = status.as_u16(), "Request rejected");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<String>) -> Result<String, TransportError> {
        self.send(Method::POST, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<String, TransportError> {
        self.send(Method::DELETE, path, None).await
    }
}
