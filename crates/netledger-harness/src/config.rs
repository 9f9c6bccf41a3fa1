/*
[INPUT]:  Command-line flags, YAML configuration file, environment fallbacks
[OUTPUT]: Resolved harness configuration
[POS]:    Configuration layer - harness setup
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, bail};
use netledger_sdk::ClientConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harness settings as read from one source: flags, YAML or the
/// environment. Every field is optional so the sources can be layered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Ledger service base URL (e.g. "http://localhost:8000")
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer API key; needs admin rights for the API key checks
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Prefix for the names of accounts and keys the harness creates
    #[serde(default)]
    pub name_prefix: Option<String>,
}

impl ConfigFile {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Fill unset fields from `fallback`; values already set win.
    pub fn or(self, fallback: ConfigFile) -> ConfigFile {
        ConfigFile {
            endpoint: self.endpoint.or(fallback.endpoint),
            api_key: self.api_key.or(fallback.api_key),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            name_prefix: self.name_prefix.or(fallback.name_prefix),
        }
    }

    /// Layer the sources: flags win over the file, the file wins over
    /// environment variables.
    pub fn layered(flags: ConfigFile, file: ConfigFile, env: ConfigFile) -> ConfigFile {
        flags.or(file).or(env)
    }
}

/// Fully resolved configuration for one harness run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub name_prefix: String,
}

impl HarnessConfig {
    pub fn resolve(settings: ConfigFile) -> anyhow::Result<Self> {
        let endpoint = settings
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .context("endpoint is required (--endpoint, config file or NETLEDGER_ENDPOINT)")?;
        let api_key = settings
            .api_key
            .filter(|k| !k.trim().is_empty())
            .context("api key is required (--api-key, config file or NETLEDGER_API_KEY)")?;
        let timeout_secs = settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
            name_prefix: settings.name_prefix.unwrap_or_else(|| "Harness".to_string()),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.timeout,
            ..ClientConfig::default()
        }
    }
}
