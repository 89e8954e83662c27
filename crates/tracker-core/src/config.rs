//! Tracker configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contract::MatchContract;
use crate::error::{AttributionError, Result};

/// Host of the production tracking service
pub const DEFAULT_BASE_URL: &str = "https://clickzin.com";

/// Path shared by the match, confirmation and event postbacks
pub const POSTBACK_PATH: &str = "/postback/ios";

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration supplied once before tracking starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Publisher API key. Required, recorded but not sent.
    pub api_key: String,
    /// Skip fingerprint matching and confirm a sentinel install
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub match_contract: MatchContract,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_SECS * 1000
}

impl TrackerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            test_mode: false,
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            match_contract: MatchContract::default(),
        }
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_match_contract(mut self, contract: MatchContract) -> Self {
        self.match_contract = contract;
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields the tracker cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AttributionError::ConfigurationMissing(
                "api_key must not be empty".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(AttributionError::InvalidURL(
                "base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(AttributionError::ConfigurationMissing(
                "timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full postback endpoint URL
    pub fn postback_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), POSTBACK_PATH)
    }
}
