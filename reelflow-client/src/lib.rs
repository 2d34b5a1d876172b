//! Reelflow HTTP Client
//!
//! A small, type-safe HTTP client for the video-generation backend's job
//! status endpoints.
//!
//! The poller does not talk to [`StudioClient`] directly; it depends on the
//! [`StatusSource`] trait, which the client implements.
//!
//! # Example
//!
//! ```no_run
//! use reelflow_client::StudioClient;
//! use reelflow_core::domain::job::JobKind;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StudioClient::new("http://localhost:8000").with_token("user-42");
//!
//!     let report = client.fetch_status(JobKind::Merge, "job-123").await?;
//!     println!("status: {}", report.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod source;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::StatusRoute;
pub use reelflow_core::dto::status::StatusReport;
pub use source::StatusSource;

use reqwest::{Client, RequestBuilder};

/// HTTP client for the video-generation backend
#[derive(Debug, Clone)]
pub struct StudioClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// Opaque user token sent as a bearer credential
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl StudioClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use reelflow_client::StudioClient;
    ///
    /// let client = StudioClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Attach the user token sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Read an API response body as text
    ///
    /// Non-success status codes become [`ClientError::ApiError`] carrying the
    /// raw body. Bodies are returned as text so callers can parse them leniently.
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}
