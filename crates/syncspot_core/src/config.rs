//! Runtime configuration for hosts embedding the core.
//!
//! Sources, lowest precedence first: field defaults, an optional JSON file,
//! then `SYNCSPOT_*` environment variables (`SYNCSPOT_MAX_PROXY_ENTRIES=12`
//! sets `max_proxy_entries`). The merged result is checked by
//! [`CoreConfig::validate`].

use crate::logging::default_log_level;
use crate::model::result::MidpointMethod;
use crate::model::submission::SubmissionLimits;
use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SYNCSPOT";

const MAX_DATES_CEILING: usize = 366;
const MAX_PROXY_ENTRIES_CEILING: usize = 200;

#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    Load(::config::ConfigError),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load config: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(value: ::config::ConfigError) -> Self {
        Self::Load(value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// SQLite file. `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub midpoint_method: MidpointMethod,
    pub max_dates_per_submission: usize,
    pub max_proxy_entries: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let limits = SubmissionLimits::default();
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
            midpoint_method: MidpointMethod::default(),
            max_dates_per_submission: limits.max_dates,
            max_proxy_entries: limits.max_proxy_entries,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document on top of the defaults. No environment lookup.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Json))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Merges `path` (optional) with the process environment and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(
            self.log_level.trim().to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(invalid("log_level", format!("unsupported `{}`", self.log_level)));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(invalid(
                    "log_dir",
                    format!("must be absolute, got `{}`", dir.display()),
                ));
            }
        }
        if self
            .db_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(invalid("db_path", "must not be blank".to_string()));
        }
        if !(1..=MAX_DATES_CEILING).contains(&self.max_dates_per_submission) {
            return Err(invalid(
                "max_dates_per_submission",
                format!("must be within 1..={MAX_DATES_CEILING}"),
            ));
        }
        if !(1..=MAX_PROXY_ENTRIES_CEILING).contains(&self.max_proxy_entries) {
            return Err(invalid(
                "max_proxy_entries",
                format!("must be within 1..={MAX_PROXY_ENTRIES_CEILING}"),
            ));
        }
        Ok(())
    }

    pub fn limits(&self) -> SubmissionLimits {
        SubmissionLimits {
            max_dates: self.max_dates_per_submission,
            max_proxy_entries: self.max_proxy_entries,
        }
    }
}

fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { field, message }
}
