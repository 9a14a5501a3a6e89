//! Layered configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `NSHEALTH_*` environment variables (e.g. `NSHEALTH_API_URL`). Command-line
//! flags are applied on top by the binary.
//!
//! ```toml
//! api_url = "https://api-mocha.celenium.io/v1"
//! api_key = "..."
//! request_timeout = "5s"
//! page_size = 25
//! rollup_limit = 10
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use nshealth_adapters::celenium::{CeleniumClient, DEFAULT_ENDPOINT};

use crate::data::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::data::units::parse_duration;
use crate::engine::EngineSettings;

const ENV_PREFIX: &str = "NSHEALTH";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Duration string, e.g. "10s" or "500ms".
    pub request_timeout: String,
    pub page_size: u32,
    pub rollup_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            request_timeout: "10s".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            rollup_limit: 10,
        }
    }
}

impl Settings {
    /// Load defaults, the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("request_timeout", defaults.request_timeout)?
            .set_default("page_size", i64::from(defaults.page_size))?
            .set_default("rollup_limit", i64::from(defaults.rollup_limit))?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Apply command-line overrides, checked like any other source.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        page_size: Option<u32>,
    ) -> Result<Self> {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(size) = page_size {
            self.page_size = size;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the timeout parses and both limits fit one upstream page.
    pub fn validate(&self) -> Result<()> {
        self.timeout()?;
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            anyhow::bail!("page_size must be between 1 and {}", MAX_PAGE_SIZE);
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.rollup_limit) {
            anyhow::bail!("rollup_limit must be between 1 and {}", MAX_PAGE_SIZE);
        }
        Ok(())
    }

    /// Parsed request timeout.
    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.request_timeout)
            .with_context(|| format!("invalid request_timeout '{}'", self.request_timeout))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            page_size: self.page_size,
            rollup_limit: self.rollup_limit,
        }
    }

    /// Build an indexer client from these settings.
    pub fn client(&self) -> Result<CeleniumClient> {
        let mut builder = CeleniumClient::builder()
            .endpoint(&self.api_url)
            .timeout(self.timeout()?);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_url, "https://api-mainnet.celenium.io/v1");
        assert_eq!(settings.timeout().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file("page_size = 25\nrequest_timeout = \"500ms\"\n");
        let settings = Settings::load_from(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.timeout().unwrap(), Duration::from_millis(500));
        assert_eq!(settings.rollup_limit, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("api_url = \"http://from-file/v1\"\n");
        let settings = Settings::load_from(
            Some(file.path()),
            env(&[
                ("NSHEALTH_API_URL", "http://from-env/v1"),
                ("NSHEALTH_API_KEY", "secret"),
                ("NSHEALTH_ROLLUP_LIMIT", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.api_url, "http://from-env/v1");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.engine_settings().rollup_limit, 3);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_timeout = env(&[("NSHEALTH_REQUEST_TIMEOUT", "soon")]);
        assert!(Settings::load_from(None, bad_timeout).is_err());

        let bad_page = env(&[("NSHEALTH_PAGE_SIZE", "0")]);
        assert!(Settings::load_from(None, bad_page).is_err());

        let no_rollups = env(&[("NSHEALTH_ROLLUP_LIMIT", "0")]);
        let err = Settings::load_from(None, no_rollups).unwrap_err();
        assert!(err.to_string().contains("rollup_limit"));

        let too_many_rollups = env(&[("NSHEALTH_ROLLUP_LIMIT", "101")]);
        assert!(Settings::load_from(None, too_many_rollups).is_err());
    }

    #[test]
    fn test_overrides_are_validated_like_config() {
        let settings = Settings::load_from(None, env(&[])).unwrap();

        let err = settings.clone().with_overrides(None, Some(500)).unwrap_err();
        assert!(err.to_string().contains("page_size"));
        assert!(settings.clone().with_overrides(None, Some(0)).is_err());

        let file = toml_file("page_size = 500\n");
        assert!(Settings::load_from(Some(file.path()), env(&[])).is_err());

        let overridden = settings
            .with_overrides(Some("http://override/v1".to_string()), Some(100))
            .unwrap();
        assert_eq!(overridden.page_size, 100);
        assert_eq!(overridden.api_url, "http://override/v1");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/nshealth.toml");
        assert!(Settings::load_from(Some(missing), env(&[])).is_err());
    }

    #[test]
    fn test_client_uses_endpoint() {
        let settings = Settings {
            api_url: "http://localhost:8080/v1/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.client().unwrap().endpoint(), "http://localhost:8080/v1");
    }
}
