//! Solver configuration
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high -> low):
//! 1. CLI arguments
//! 2. Environment variables (YXSOLVE_*)
//! 3. Config file (--config, or yaoxiang-solve.ron in the working directory)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use yaoxiang_solve::util::config::SolverConfig;
//!
//! let config = SolverConfig::discover().unwrap().with_env_overrides().unwrap();
//! let choice = config.into_choice();
//! ```

use crate::solve::{OverflowPolicy, SolverChoice};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "yaoxiang-solve.ron";

pub const ENV_OVERFLOW_DEPTH: &str = "YXSOLVE_OVERFLOW_DEPTH";
pub const ENV_MAX_SIZE: &str = "YXSOLVE_MAX_SIZE";
pub const ENV_NO_CACHE: &str = "YXSOLVE_NO_CACHE";

/// Solver settings as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of goals on the solver stack
    #[serde(default = "default_overflow_depth")]
    pub overflow_depth: usize,
    /// Maximum size of a subgoal's types before it is truncated
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Keep completed answers between queries
    #[serde(default = "default_caching")]
    pub caching: bool,
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,
}

fn default_overflow_depth() -> usize {
    SolverChoice::DEFAULT_OVERFLOW_DEPTH
}

fn default_max_size() -> usize {
    SolverChoice::DEFAULT_MAX_SIZE
}

fn default_caching() -> bool {
    true
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            overflow_depth: default_overflow_depth(),
            max_size: default_max_size(),
            caching: default_caching(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

/// Path of the config file in the working directory
pub fn get_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
}

impl SolverConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Load `yaoxiang-solve.ron` from the working directory, or the defaults
    /// if there is none.
    pub fn discover() -> Result<Self, ConfigError> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply `YXSOLVE_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `YXSOLVE_*` overrides read through `lookup`.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_OVERFLOW_DEPTH) {
            self.overflow_depth = parse_var(ENV_OVERFLOW_DEPTH, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_SIZE) {
            self.max_size = parse_var(ENV_MAX_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_NO_CACHE) {
            match value.trim() {
                "" | "0" | "false" => {}
                "1" | "true" => self.caching = false,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: ENV_NO_CACHE,
                        value,
                    })
                }
            }
        }
        Ok(self)
    }

    pub fn into_choice(self) -> SolverChoice {
        SolverChoice::Recursive {
            overflow_depth: self.overflow_depth,
            max_size: self.max_size,
            caching_enabled: self.caching,
            overflow_policy: self.overflow_policy,
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

fn parse_var(
    name: &'static str,
    value: &str,
) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar {
            name,
            value: value.to_string(),
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("cannot write config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid value `{value}` for {name}")]
    InvalidVar { name: &'static str, value: String },
}

#[cfg(test)]
mod tests;
