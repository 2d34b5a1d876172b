//! Configuration module
//!
//! Combines command-line options with the flow settings from the environment
//! and opens the session store they point at.

use anyhow::{Context, Result};
use reelflow_client::StudioClient;
use reelflow_flow::{FlowConfig, JsonFileStore, SessionContext};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI configuration
pub struct Config {
    /// Poller and wizard settings
    pub flow: FlowConfig,
    /// Token given on the command line, if any
    pub token: Option<String>,
    /// Session opened from `flow.store_path`
    pub session: SessionContext,
}

impl Config {
    /// Builds the configuration and opens the session store
    pub fn load(api_url: String, token: Option<String>, store: PathBuf) -> Result<Self> {
        let mut flow = FlowConfig::from_env();
        flow.api_url = api_url;
        flow.store_path = store;
        flow.validate()?;

        let store = JsonFileStore::open(&flow.store_path).with_context(|| {
            format!(
                "Failed to open session store {}",
                flow.store_path.display()
            )
        })?;

        Ok(Self {
            flow,
            token,
            session: SessionContext::new(Arc::new(store)),
        })
    }

    /// HTTP client authenticated with the explicit or the stored token
    pub fn client(&self) -> StudioClient {
        let client = StudioClient::new(self.flow.api_url.clone());
        match self.token.clone().or_else(|| self.session.token()) {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}
