//! Gateway configuration: credential, base URL, deadline, proxy.
//!
//! Values come from (highest priority first) explicit builder calls, a YAML
//! file, environment variables, and finally the OS keyring for the credential.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::transport::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_MS};
use crate::{Error, ErrorContext, Result};

pub const ENV_API_KEY: &str = "MOONDREAM_API_KEY";
pub const ENV_API_BASE: &str = "MOONDREAM_API_BASE";
pub const ENV_TIMEOUT_MS: &str = "MOONDREAM_TIMEOUT_MS";
pub const ENV_PROXY_URL: &str = "MOONDREAM_PROXY_URL";

const KEYRING_SERVICE: &str = "pocket-senpai";
const KEYRING_USER: &str = "moondream";

/// Partial configuration; unset fields fall through to the next source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub proxy_url: Option<String>,
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_var(ENV_API_KEY),
            base_url: non_empty_var(ENV_API_BASE),
            timeout_ms: non_empty_var(ENV_TIMEOUT_MS).and_then(|s| s.parse::<u64>().ok()),
            proxy_url: non_empty_var(ENV_PROXY_URL),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                "invalid vision config",
                ErrorContext::new().with_details(e.to_string()),
            )
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                "cannot read vision config",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string()),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: VisionConfig) -> Self {
        Self {
            api_key: self.api_key.or(fallback.api_key),
            base_url: self.base_url.or(fallback.base_url),
            timeout_ms: self.timeout_ms.or(fallback.timeout_ms),
            proxy_url: self.proxy_url.or(fallback.proxy_url),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn base_url_or_default(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Credential from this config, or from the OS keyring.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(keyring_api_key)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn keyring_api_key() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    entry.get_password().ok().filter(|k| !k.trim().is_empty())
}
