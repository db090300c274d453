//! Environment-driven runtime configuration.
//!
//! # Invariants
//! - `page_limits.default_page_size()` lies in `1..=page_limits.max_page_size()`.
//! - Unset variables fall back to defaults; malformed ones are errors.

use crate::logging::default_log_level;
use crate::query::PageLimits;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "NEWSDESK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "NEWSDESK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "NEWSDESK_LOG_DIR";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "NEWSDESK_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_VAR: &str = "NEWSDESK_MAX_PAGE_SIZE";

const DEFAULT_DB_PATH: &str = "newsdesk.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    InvalidPageLimits { default_page_size: u32, max_page_size: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::InvalidPageLimits {
                default_page_size,
                max_page_size,
            } => write!(
                f,
                "default page size {default_page_size} must be between 1 and max page size {max_page_size}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub page_limits: PageLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            page_limits: PageLimits::default(),
        }
    }
}

impl CoreConfig {
    /// Reads `NEWSDESK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let page_limits = PageLimits::new(
            parse_u32(DEFAULT_PAGE_SIZE_VAR, read(DEFAULT_PAGE_SIZE_VAR))?
                .unwrap_or(defaults.page_limits.default_page_size()),
            parse_u32(MAX_PAGE_SIZE_VAR, read(MAX_PAGE_SIZE_VAR))?
                .unwrap_or(defaults.page_limits.max_page_size()),
        )?;

        Ok(Self {
            database_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
            page_limits,
        })
    }
}

fn parse_u32(key: &'static str, raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    raw.map(|value| {
        value
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue { key, value })
    })
    .transpose()
}
