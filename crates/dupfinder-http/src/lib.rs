//! HTTP transport for dupfinder
//!
//! Provides a mockable, configurable HTTP client used to talk to the Snyk REST API.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Timeouts, retries, proxy, user-agent
//! - **Middleware support**: Retry logic with exponential backoff
//! - **Testing support**: Easy mocking with wiremock

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;

pub use client::{shared_client, HttpClient, HttpClientTrait};
pub use config::HttpConfig;
pub use error::{HttpError, Result};
pub use middleware::{RetryConfig, RetryMiddleware, Retryable};

/// Re-export commonly used types
pub use reqwest::{header, Method, StatusCode};
