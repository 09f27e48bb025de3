//! Runtime policy
//!
//! The knobs that select between historical behaviours, resolved from a
//! loaded [`strux_config::Config`].

use crate::assign::MissingSource;
use crate::collections::BatchMode;
use strux_config::project::DEFAULT_MAX_REDUCE_STEPS;
use strux_config::{Config, ConfigLoader, ConfigResult};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Bound on `to_plain` reductions per key
    pub max_reduce_steps: usize,
    /// How multi-value insertions commit
    pub batch: BatchMode,
    /// How field assignment treats a missing source
    pub missing_source: MissingSource,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_reduce_steps: DEFAULT_MAX_REDUCE_STEPS,
            batch: BatchMode::default(),
            missing_source: MissingSource::default(),
        }
    }
}

impl Policy {
    /// Resolve a policy from configuration. The loader validates every
    /// value, so unknown names only come from a hand-built `Config`; those
    /// fall back to the defaults.
    pub fn from_config(config: &Config) -> Self {
        let policy = Self {
            max_reduce_steps: config.max_reduce_steps(),
            batch: BatchMode::parse(config.batch()).unwrap_or_default(),
            missing_source: MissingSource::parse(config.missing_source()).unwrap_or_default(),
        };
        tracing::debug!(?policy, "resolved runtime policy");
        policy
    }

    /// Load the configuration governing `dir` and resolve it
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config = ConfigLoader::new().load_from_directory(dir)?;
        Ok(Self::from_config(&config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_policy() {
        let policy = Policy::default();
        assert_eq!(policy.max_reduce_steps, 64);
        assert_eq!(policy.batch, BatchMode::Atomic);
        assert_eq!(policy.missing_source, MissingSource::Ignore);
    }

    #[test]
    fn test_from_project_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("strux.toml");
        fs::write(
            &path,
            r#"
[keys]
max_reduce_steps = 8

[collections]
batch = "sequential"

[assign]
missing_source = "reject"
"#,
        )
        .unwrap();

        let config = ConfigLoader::with_global_path(temp.path().join("no-global.toml"))
            .load_from_file(&path)
            .unwrap();
        let policy = Policy::from_config(&config);

        assert_eq!(policy.max_reduce_steps, 8);
        assert_eq!(policy.batch, BatchMode::Sequential);
        assert_eq!(policy.missing_source, MissingSource::Reject);
    }
}
