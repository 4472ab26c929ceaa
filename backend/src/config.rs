//! # Client Configuration
//!
//! Connection settings for the hosted record store. Values come from an
//! optional YAML file named by `BUDGET_TRACKER_CONFIG`, then individual
//! `BUDGET_TRACKER_*` environment variables override whatever the file set:
//!
//! ```yaml
//! api_url: https://records.example.com/v1
//! project_id: budget-tracker
//! public_key: pk_live_...
//! timeout_secs: 30
//! log_level: info
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE_VAR: &str = "BUDGET_TRACKER_CONFIG";
pub const API_URL_VAR: &str = "BUDGET_TRACKER_API_URL";
pub const PROJECT_ID_VAR: &str = "BUDGET_TRACKER_PROJECT_ID";
pub const PUBLIC_KEY_VAR: &str = "BUDGET_TRACKER_PUBLIC_KEY";
pub const TIMEOUT_VAR: &str = "BUDGET_TRACKER_TIMEOUT_SECS";
pub const LOG_LEVEL_VAR: &str = "BUDGET_TRACKER_LOG_LEVEL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_secs: u64,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            project_id: String::new(),
            public_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("project_id", &self.project_id)
            .field("public_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ClientConfig {
    /// Load from the process environment and validate
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(api_url) = lookup(API_URL_VAR) {
            config.api_url = api_url;
        }
        if let Some(project_id) = lookup(PROJECT_ID_VAR) {
            config.project_id = project_id;
        }
        if let Some(public_key) = lookup(PUBLIC_KEY_VAR) {
            config.public_key = public_key;
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            config.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, timeout))?;
        }
        if let Some(log_level) = lookup(LOG_LEVEL_VAR) {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded record store config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            bail!("project id is required (set {})", PROJECT_ID_VAR);
        }
        if self.public_key.trim().is_empty() {
            bail!("public key is required (set {})", PUBLIC_KEY_VAR);
        }

        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("api url {:?} is not a valid URL", self.api_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("api url must use http or https, got {}", url.scheme());
        }

        if self.timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_load_from_environment_with_defaults() {
        let config = ClientConfig::load_with(env(&[
            (API_URL_VAR, "https://records.example.com"),
            (PROJECT_ID_VAR, "proj"),
            (PUBLIC_KEY_VAR, "pk"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://records.example.com");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url: https://file.example.com\nproject_id: from-file\npublic_key: pk-file\ntimeout_secs: 5"
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ClientConfig::load_with(env(&[
            (CONFIG_FILE_VAR, path.as_str()),
            (PROJECT_ID_VAR, "from-env"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://file.example.com");
        assert_eq!(config.project_id, "from-env");
        assert_eq!(config.public_key, "pk-file");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_validation_failures() {
        let missing_key = ClientConfig::load_with(env(&[
            (API_URL_VAR, "https://records.example.com"),
            (PROJECT_ID_VAR, "proj"),
        ]));
        assert!(missing_key.is_err());

        let bad_scheme = ClientConfig::load_with(env(&[
            (API_URL_VAR, "ftp://records.example.com"),
            (PROJECT_ID_VAR, "proj"),
            (PUBLIC_KEY_VAR, "pk"),
        ]));
        assert!(bad_scheme.is_err());

        let bad_timeout = ClientConfig::load_with(env(&[
            (API_URL_VAR, "https://records.example.com"),
            (PROJECT_ID_VAR, "proj"),
            (PUBLIC_KEY_VAR, "pk"),
            (TIMEOUT_VAR, "soon"),
        ]));
        assert!(bad_timeout.is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let result = ClientConfig::from_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_public_key() {
        let config = ClientConfig {
            public_key: "pk_live_secret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("pk_live_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
