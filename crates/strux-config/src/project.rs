//! Project Configuration (strux.toml)
//!
//! Handles configuration stored in `strux.toml` at the project root. The global
//! file `~/.strux/config.toml` uses the same schema.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on `to_plain` reductions performed while stabilizing a key
pub const DEFAULT_MAX_REDUCE_STEPS: usize = 64;

/// Configuration from strux.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Key stabilization settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeysConfig>,

    /// Class-coercing collection settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<CollectionsConfig>,

    /// Field assignment settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign: Option<AssignConfig>,
}

/// Key stabilization settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct KeysConfig {
    /// Maximum number of `to_plain` reductions before giving up (default: 64)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reduce_steps: Option<usize>,
}

/// Class-coercing collection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CollectionsConfig {
    /// Batch insertion mode ("atomic", "sequential")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

/// Field assignment settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AssignConfig {
    /// What to do when no source is given ("ignore", "reject")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_source: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { error, .. } => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "loaded strux configuration");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: Default::default(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(steps) = self.keys.as_ref().and_then(|k| k.max_reduce_steps) {
            if steps == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "keys.max_reduce_steps".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if let Some(batch) = self.collections.as_ref().and_then(|c| c.batch.as_deref()) {
            validate_batch(batch)?;
        }

        if let Some(missing) = self.assign.as_ref().and_then(|a| a.missing_source.as_deref()) {
            validate_missing_source(missing)?;
        }

        Ok(())
    }

    /// Merge another configuration into this one.
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if let Some(keys) = &other.keys {
            let ours = self.keys.get_or_insert_with(Default::default);
            if keys.max_reduce_steps.is_some() {
                ours.max_reduce_steps = keys.max_reduce_steps;
            }
        }
        if let Some(collections) = &other.collections {
            let ours = self.collections.get_or_insert_with(Default::default);
            if collections.batch.is_some() {
                ours.batch = collections.batch.clone();
            }
        }
        if let Some(assign) = &other.assign {
            let ours = self.assign.get_or_insert_with(Default::default);
            if assign.missing_source.is_some() {
                ours.missing_source = assign.missing_source.clone();
            }
        }
    }

    pub fn max_reduce_steps(&self) -> Option<usize> {
        self.keys.as_ref().and_then(|k| k.max_reduce_steps)
    }

    pub fn batch(&self) -> Option<&str> {
        self.collections.as_ref().and_then(|c| c.batch.as_deref())
    }

    pub fn missing_source(&self) -> Option<&str> {
        self.assign.as_ref().and_then(|a| a.missing_source.as_deref())
    }
}

pub(crate) fn validate_batch(value: &str) -> ConfigResult<()> {
    if !matches!(value, "atomic" | "sequential") {
        return Err(ConfigError::InvalidValue {
            field: "collections.batch".to_string(),
            reason: format!("must be 'atomic' or 'sequential', got '{}'", value),
        });
    }
    Ok(())
}

pub(crate) fn validate_missing_source(value: &str) -> ConfigResult<()> {
    if !matches!(value, "ignore" | "reject") {
        return Err(ConfigError::InvalidValue {
            field: "assign.missing_source".to_string(),
            reason: format!("must be 'ignore' or 'reject', got '{}'", value),
        });
    }
    Ok(())
}
