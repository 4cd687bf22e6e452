//! Configuration file handling.
//!
//! This module provides loading and saving of mvntrust configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/mvntrust/config.toml`
//! - macOS: `~/Library/Application Support/mvntrust/config.toml`
//! - Windows: `%APPDATA%\mvntrust\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! policy = "lenient"
//! default_format = "table"
//! run_scorecard = true
//! http_timeout_secs = 10
//! scorecard_timeout_secs = 300
//! cache_ttl_hours = 24
//!
//! [weights]
//! security = 0.3334
//! release_cadence = 0.3333
//! compatibility = 0.3333
//! ```
//!
//! # Credentials
//!
//! API credentials are read from the environment first
//! (`LIBRARIES_IO_API_KEY`, `GITHUB_AUTH_TOKEN`) and fall back to the
//! optional config-file fields. They are never compiled into the binary.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TrustError;

/// Environment variable holding the libraries.io API key.
pub const LIBRARIES_IO_KEY_ENV: &str = "LIBRARIES_IO_API_KEY";
/// Environment variable holding the GitHub token passed to the scorecard tool.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_AUTH_TOKEN";

/// What to do when a signal fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPolicy {
    /// Abort the whole run on the first fetch failure.
    Strict,
    /// Continue with available signals and mark missing ones.
    Lenient,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(FetchPolicy::Strict),
            "lenient" => Ok(FetchPolicy::Lenient),
            _ => Err(format!("Unknown policy: {}. Use 'strict' or 'lenient'", s)),
        }
    }
}

/// Relative weight of each signal in the aggregate score.
///
/// Weights must be non-negative and sum to 1. The defaults weigh all
/// three signals equally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub security: f64,
    pub release_cadence: f64,
    pub compatibility: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            security: 1.0 / 3.0,
            release_cadence: 1.0 / 3.0,
            compatibility: 1.0 / 3.0,
        }
    }
}

impl Weights {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn validate(&self) -> Result<(), TrustError> {
        let entries = [self.security, self.release_cadence, self.compatibility];
        if entries.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(TrustError::Config(
                "signal weights must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = entries.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(TrustError::Config(format!(
                "signal weights must sum to 1, got {}",
                sum
            )));
        }
        Ok(())
    }

    pub fn for_kind(&self, kind: crate::model::SignalKind) -> f64 {
        use crate::model::SignalKind;
        match kind {
            SignalKind::SecurityScorecard => self.security,
            SignalKind::ReleaseFrequency => self.release_cadence,
            SignalKind::VersionCompatibility => self.compatibility,
        }
    }
}

/// Application configuration.
///
/// This struct represents all configurable options for mvntrust.
/// It can be loaded from a TOML file or created with default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Behavior on signal fetch failure.
    ///
    /// Default: lenient
    pub policy: FetchPolicy,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Whether to run the containerized scorecard tool by default.
    ///
    /// Default: true
    pub run_scorecard: bool,

    /// Timeout for registry HTTP requests, in seconds.
    ///
    /// Default: 10
    pub http_timeout_secs: u64,

    /// Timeout for a scorecard container run, in seconds.
    ///
    /// Default: 300
    pub scorecard_timeout_secs: u64,

    /// How long to cache registry responses, in hours.
    ///
    /// Default: 24 hours
    pub cache_ttl_hours: u64,

    /// Relative signal weights for aggregation.
    pub weights: Weights,

    /// Fallback for the libraries.io API key when the environment
    /// variable is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries_io_api_key: Option<String>,

    /// Fallback for the GitHub token when the environment variable
    /// is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: FetchPolicy::Lenient,
            default_format: "table".to_string(),
            run_scorecard: true,
            http_timeout_secs: 10,
            scorecard_timeout_secs: 300,
            cache_ttl_hours: 24,
            weights: Weights::default(),
            libraries_io_api_key: None,
            github_token: None,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mvntrust")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// The libraries.io API key: environment first, config file second.
    pub fn libraries_io_api_key(&self) -> Option<String> {
        std::env::var(LIBRARIES_IO_KEY_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.libraries_io_api_key.clone())
    }

    /// The GitHub token handed to the scorecard container: environment
    /// first, config file second.
    pub fn github_token(&self) -> Option<String> {
        std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.github_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.policy, FetchPolicy::Lenient);
        assert_eq!(config.default_format, "table");
        assert!(config.run_scorecard);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.scorecard_timeout_secs, 300);
        assert_eq!(config.cache_ttl_hours, 24);
        assert!(config.libraries_io_api_key.is_none());
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_default_weights_valid() {
        Weights::default().validate().unwrap();
    }

    #[test]
    fn test_weights_reject_bad_sum() {
        let weights = Weights {
            security: 0.5,
            release_cadence: 0.5,
            compatibility: 0.5,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_weights_reject_negative() {
        let weights = Weights {
            security: 1.2,
            release_cadence: -0.1,
            compatibility: -0.1,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<FetchPolicy>().unwrap(), FetchPolicy::Strict);
        assert_eq!("LENIENT".parse::<FetchPolicy>().unwrap(), FetchPolicy::Lenient);
        assert!("permissive".parse::<FetchPolicy>().is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(back.policy, config.policy);
        assert_eq!(back.cache_ttl_hours, config.cache_ttl_hours);
        assert!((back.weights.security - config.weights.security).abs() < 1e-12);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("policy = \"strict\"").unwrap();
        assert_eq!(config.policy, FetchPolicy::Strict);
        assert_eq!(config.http_timeout_secs, 10);
        Weights::default().validate().unwrap();
    }
}
