//! Flow configuration
//!
//! Defines the tunables of the poller and the wizard, plus where the session
//! store lives and which backend to talk to.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FlowError;

/// Flow configuration
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub api_url: String,

    /// Fixed delay between two status requests of one job
    pub poll_interval: Duration,

    /// How long the wizard shows the "redirecting" state before moving on
    pub redirect_delay: Duration,

    /// Per-request timeout; `None` waits for as long as the request takes
    pub request_timeout: Option<Duration>,

    /// Location of the persisted session store
    pub store_path: PathBuf,
}

impl FlowConfig {
    /// Creates a new configuration with defaults
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            poll_interval: Duration::from_secs(3),
            redirect_delay: Duration::from_secs(5),
            request_timeout: None,
            store_path: PathBuf::from(".reelflow/session.json"),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables, all optional:
    /// - REELFLOW_API_URL (default: http://localhost:8000)
    /// - REELFLOW_POLL_INTERVAL_MS (default: 3000)
    /// - REELFLOW_REDIRECT_DELAY_MS (default: 5000)
    /// - REELFLOW_REQUEST_TIMEOUT_MS (default: unset, no timeout)
    /// - REELFLOW_STORE (default: .reelflow/session.json)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("REELFLOW_API_URL") {
            config.api_url = url;
        }

        if let Some(interval) = millis_from_env("REELFLOW_POLL_INTERVAL_MS") {
            config.poll_interval = interval;
        }

        if let Some(delay) = millis_from_env("REELFLOW_REDIRECT_DELAY_MS") {
            config.redirect_delay = delay;
        }

        config.request_timeout = millis_from_env("REELFLOW_REQUEST_TIMEOUT_MS");

        if let Ok(path) = std::env::var("REELFLOW_STORE") {
            config.store_path = PathBuf::from(path);
        }

        config
    }

    /// Sets the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the redirect delay
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Sets a per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.api_url.is_empty() {
            return Err(FlowError::InvalidConfig(
                "api_url cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(FlowError::InvalidConfig(
                "api_url must start with http:// or https://".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(FlowError::InvalidConfig(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(FlowError::InvalidConfig(
                "request_timeout must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000".to_string())
    }
}

fn millis_from_env(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlowConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.redirect_delay, Duration::from_secs(5));
        assert_eq!(config.request_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FlowConfig::default();

        config.api_url = String::new();
        assert!(config.validate().is_err());

        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://api.example.com".to_string();
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = FlowConfig::default().with_request_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = FlowConfig::default()
            .with_poll_interval(Duration::from_millis(250))
            .with_redirect_delay(Duration::from_millis(10))
            .with_request_timeout(Duration::from_secs(20));

        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.redirect_delay, Duration::from_millis(10));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(20)));
    }
}
