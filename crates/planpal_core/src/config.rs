//! Runtime configuration for one PlanPal session.
//!
//! # Responsibility
//! - Hold the storage root, logging setup and seed categories.
//! - Resolve relative directories against a base directory.
//!
//! # Invariants
//! - A validated config has an absolute `log_dir` once resolved.
//! - Seed categories are non-blank and unique.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default storage root, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Log subdirectory used when no log directory is configured.
pub const DEFAULT_LOG_SUBDIR: &str = "logs";
/// Categories every new session starts with.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["emergency", "friend", "family"];

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Logging(LoggingError),
    BlankCategory,
    DuplicateCategory(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::BlankCategory => write!(f, "default categories must not be blank"),
            Self::DuplicateCategory(name) => {
                write!(f, "default category listed twice: `{name}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root holding one subdirectory per entity kind.
    pub data_dir: PathBuf,
    /// Rolling log directory; `<data_dir>/logs` when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: LogLevel,
    pub default_categories: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_dir: None,
            log_level: default_log_level(),
            default_categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Parses and applies a textual log level.
    pub fn with_log_level(mut self, level: &str) -> Result<Self, ConfigError> {
        self.log_level = LogLevel::parse(level)?;
        Ok(self)
    }

    /// Makes `data_dir` and `log_dir` absolute relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.data_dir.is_relative() {
            self.data_dir = base.join(&self.data_dir);
        }
        self.log_dir = Some(match self.log_dir.take() {
            Some(dir) if dir.is_relative() => base.join(dir),
            Some(dir) => dir,
            None => self.data_dir.join(DEFAULT_LOG_SUBDIR),
        });
        self
    }

    /// Effective log directory.
    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_LOG_SUBDIR))
    }

    /// Checks the seed categories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in &self.default_categories {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::BlankCategory);
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateCategory(name.to_string()));
            }
        }
        Ok(())
    }
}
