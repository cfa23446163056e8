//! Configuration types for voxchat
//!
//! The one knob is the answer service endpoint; everything else about the
//! session is fixed behavior. There is no config file loading and no
//! environment lookup — the presentation layer constructs the config.

use crate::error::ChatError;
use serde::{Deserialize, Serialize};

/// Default answer service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/qa";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Answer service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Config {
    /// Validate the endpoint URL format
    pub fn validate(&self) -> Result<(), ChatError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ChatError::Config(format!(
                "endpoint must start with http:// or https://, got: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}
