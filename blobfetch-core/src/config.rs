// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration for fetching
//!
//! All settings are optional in the TOML form. Without a config file the
//! HTTP client runs with its own defaults and no request timeout.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default `User-Agent` sent with URL fetches
pub const DEFAULT_USER_AGENT: &str = concat!("blobfetch/", env!("CARGO_PKG_VERSION"));

/// Default progress log granularity, in percent of the expected size
pub const DEFAULT_PROGRESS_STEP_PERCENT: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// `User-Agent` header for URL fetches
    pub user_agent: String,

    /// Whole-request timeout in seconds.
    /// None = no timeout beyond the HTTP client's own behavior
    pub timeout_secs: Option<u64>,

    /// Emit a progress event each time this many more percent are read
    pub progress_step_percent: u8,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
            progress_step_percent: DEFAULT_PROGRESS_STEP_PERCENT,
        }
    }
}

impl FetchConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, FetchError> {
        let config: Self = toml::from_str(s).map_err(|e| FetchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FetchError::io(format!("config {}", path.display()), e))?;
        Self::from_toml_str(&text)
    }

    /// Create a config with a request timeout, rounded up to whole seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.user_agent.trim().is_empty() {
            return Err(FetchError::Config("user_agent must not be empty".to_string()));
        }
        if !(1..=100).contains(&self.progress_step_percent) {
            return Err(FetchError::Config(format!(
                "progress_step_percent must be between 1 and 100, got {}",
                self.progress_step_percent
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(FetchError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert!(config.user_agent.starts_with("blobfetch/"));
        assert_eq!(config.timeout(), None);
        assert_eq!(config.progress_step_percent, DEFAULT_PROGRESS_STEP_PERCENT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FetchConfig::from_toml_str("timeout_secs = 30\n").unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_full_toml() {
        let config = FetchConfig::from_toml_str(
            r#"
            user_agent = "mirror-bot/2"
            timeout_secs = 5
            progress_step_percent = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.user_agent, "mirror-bot/2");
        assert_eq!(config.progress_step_percent, 25);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(FetchConfig::from_toml_str("progress_step_percent = 0").is_err());
        assert!(FetchConfig::from_toml_str("timeout_secs = 0").is_err());
        assert!(FetchConfig::from_toml_str("user_agent = \"  \"").is_err());
        assert!(FetchConfig::from_toml_str("retries = 3").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetch.toml");
        std::fs::write(&path, "progress_step_percent = 50\n").unwrap();
        assert_eq!(FetchConfig::from_file(&path).unwrap().progress_step_percent, 50);

        let missing = FetchConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(FetchError::Io { .. })));
    }

    #[test]
    fn test_with_timeout() {
        let config = FetchConfig::default().with_timeout(Duration::from_secs(12));
        assert_eq!(config.timeout_secs, Some(12));
    }

    #[test]
    fn test_sub_second_timeout_rounds_up() {
        let config = FetchConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout(), Some(Duration::from_secs(1)));
        assert!(config.validate().is_ok());

        let config = FetchConfig::default().with_timeout(Duration::from_millis(2500));
        assert_eq!(config.timeout_secs, Some(3));
    }
}
