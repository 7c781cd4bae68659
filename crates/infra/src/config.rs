//! Configuration loading and representation.
//!
//! Settings come from a JSON document and are then overridden by
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LIGHTSEC_AUTH_TYPE` | `auth_type` |
//! | `LIGHTSEC_AUTHORITIES_ENABLED` | `processor.authorities_enabled` |
//! | `LIGHTSEC_GROUPS_ENABLED` | `processor.groups_enabled` |

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use lightsec_auth::{AuthType, ProcessorConfig, StaticAuthorities};
use lightsec_core::QueryKey;
use lightsec_observability::LogConfig;

pub const ENV_AUTH_TYPE: &str = "LIGHTSEC_AUTH_TYPE";
pub const ENV_AUTHORITIES_ENABLED: &str = "LIGHTSEC_AUTHORITIES_ENABLED";
pub const ENV_GROUPS_ENABLED: &str = "LIGHTSEC_GROUPS_ENABLED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown query key '{0}'")]
    UnknownQueryKey(String),

    #[error("{var} must not be blank")]
    BlankAuthType { var: &'static str },

    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },
}

/// Complete configuration of the security core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Which processor resolves principals.
    pub auth_type: AuthType,
    pub processor: ProcessorConfig,
    /// Query text overrides keyed by catalog key.
    pub queries: BTreeMap<String, String>,
    /// Grants merged into every resolution of the named subject.
    pub additional_authorities: StaticAuthorities,
    pub logging: LogConfig,
}

impl SecurityConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading security config {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parsing security config {}", path.display()))
    }

    /// Load `path` (if given), then apply the process environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config
            .apply_env_overrides(|var| std::env::var(var).ok())
            .context("applying environment overrides")?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_AUTH_TYPE) {
            self.auth_type = value
                .parse()
                .map_err(|_| ConfigError::BlankAuthType { var: ENV_AUTH_TYPE })?;
        }
        if let Some(value) = lookup(ENV_AUTHORITIES_ENABLED) {
            self.processor.authorities_enabled = parse_bool(ENV_AUTHORITIES_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_GROUPS_ENABLED) {
            self.processor.groups_enabled = parse_bool(ENV_GROUPS_ENABLED, &value)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.queries.keys().find(|k| QueryKey::parse(k).is_none()) {
            Some(unknown) => Err(ConfigError::UnknownQueryKey(unknown.clone())),
            None => Ok(()),
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
