//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::{
    validate_batch, validate_missing_source, ProjectConfig, DEFAULT_MAX_REDUCE_STEPS,
};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE: &str = "strux.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.strux/config.toml) - lowest priority
/// 2. Project config (./strux.toml) - overrides global
/// 3. Environment variables (STRUX_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after merging every source
    pub settings: ProjectConfig,

    /// Project root directory (where strux.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads the global configuration from `path`
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find strux.toml, then layers it over the
    /// global config if one exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        let mut settings = self.global_settings();
        settings.merge(&project_config);
        let settings = apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;

        let mut settings = self.global_settings();
        settings.merge(&project_config);
        let settings = apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => {
                    tracing::trace!(start = %start_dir.display(), "no strux.toml found");
                    return Ok((None, ProjectConfig::default()));
                }
            }
        }
    }

    /// Global settings, or the defaults when the global file can't be used
    fn global_settings(&mut self) -> ProjectConfig {
        self.load_global_config().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring global strux configuration");
            ProjectConfig::default()
        })
    }

    /// Load global configuration from ~/.strux/config.toml
    fn load_global_config(&mut self) -> ConfigResult<ProjectConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = Self::global_config_dir()?.join("config.toml");
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional
        if !path.exists() {
            return Ok(ProjectConfig::default());
        }

        ProjectConfig::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.strux)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".strux"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment variable overrides
///
/// Recognised variables: STRUX_MAX_REDUCE_STEPS, STRUX_BATCH, STRUX_MISSING_SOURCE
fn apply_env_overrides(mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
    if let Ok(steps) = env::var("STRUX_MAX_REDUCE_STEPS") {
        let parsed = steps
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "STRUX_MAX_REDUCE_STEPS".to_string(),
                reason: format!("expected a positive integer, got '{}'", steps),
            })?;
        config
            .keys
            .get_or_insert_with(Default::default)
            .max_reduce_steps = Some(parsed);
    }

    if let Ok(batch) = env::var("STRUX_BATCH") {
        let batch = batch.to_lowercase();
        validate_batch(&batch)?;
        config.collections.get_or_insert_with(Default::default).batch = Some(batch);
    }

    if let Ok(missing) = env::var("STRUX_MISSING_SOURCE") {
        let missing = missing.to_lowercase();
        validate_missing_source(&missing)?;
        config
            .assign
            .get_or_insert_with(Default::default)
            .missing_source = Some(missing);
    }

    Ok(config)
}

impl Config {
    /// Effective reduction bound (env > project > global > default)
    pub fn max_reduce_steps(&self) -> usize {
        self.settings
            .max_reduce_steps()
            .unwrap_or(DEFAULT_MAX_REDUCE_STEPS)
    }

    /// Effective batch mode, "atomic" unless configured
    pub fn batch(&self) -> &str {
        self.settings.batch().unwrap_or("atomic")
    }

    /// Effective missing-source policy, "ignore" unless configured
    pub fn missing_source(&self) -> &str {
        self.settings.missing_source().unwrap_or("ignore")
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has strux.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
