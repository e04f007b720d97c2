//! HTTP client implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method, StatusCode};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Execute a GET request and return the response body
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<String>;

    /// Execute a custom body-less HTTP request and return the response body
    async fn request(&self, method: Method, url: &str, headers: &HeaderMap) -> Result<String>;
}

/// Production HTTP client
///
/// Each call makes exactly one attempt; retrying is left to the caller so the
/// caller decides which failures are worth another round trip.
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        // Configure proxy if provided
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<String> {
        debug!("HTTP GET: {}", url);
        self.request(Method::GET, url, headers).await
    }

    async fn request(&self, method: Method, url: &str, headers: &HeaderMap) -> Result<String> {
        let url = url
            .parse::<url::Url>()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let response = self
            .inner
            .request(method, url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| classify_send_error(e, &self.config))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_send_error(e, &self.config))?;

        // Check for HTTP error status
        if !status.is_success() {
            return Err(HttpError::HttpStatus {
                status,
                message: error_message(status, body),
            });
        }

        Ok(body)
    }
}

fn classify_send_error(error: reqwest::Error, config: &HttpConfig) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(config.timeout())
    } else {
        HttpError::RequestFailed(error)
    }
}

fn error_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    }
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
