use std::env;
use std::path::PathBuf;

use migrator_pipeline::verifier::{DEFAULT_JSON_FIELD_PATTERNS, DEFAULT_SAMPLE_LIMIT};
use migrator_pipeline::{DEFAULT_BATCH_SIZE, VerifierConfig};
use migrator_shared::types::DEFAULT_MAX_MISMATCHES;
use thiserror::Error;

const TARGET_DATABASE_URL: &str = "TARGET_DATABASE_URL";
const SOURCE_DATABASE_URL: &str = "SOURCE_DATABASE_URL";
const SCHEMA_PATH: &str = "SCHEMA_PATH";
const MIGRATION_BATCH_SIZE: &str = "MIGRATION_BATCH_SIZE";
const REPORT_DIR: &str = "REPORT_DIR";
const VERIFY_JSON_FIELDS: &str = "VERIFY_JSON_FIELDS";
const VERIFY_SAMPLE_LIMIT: &str = "VERIFY_SAMPLE_LIMIT";
const VERIFY_MAX_MISMATCHES: &str = "VERIFY_MAX_MISMATCHES";

const DEFAULT_SOURCE_DATABASE_URL: &str = "sqlite://prisma/dev.db";
const DEFAULT_SCHEMA_PATH: &str = "prisma/schema.prisma";
const DEFAULT_REPORT_DIR: &str = ".";

/// Errors raised while reading the environment. All of them are fatal and
/// surface before any store is opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a {expected} connection URL")]
    InvalidUrl {
        name: &'static str,
        expected: &'static str,
    },
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must list at least one pattern")]
    EmptyPatternList(&'static str),
}

/// Settings shared by the `migrate` and `verify` binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    pub source_url: String,
    pub target_url: String,
    pub schema_path: PathBuf,
    pub batch_size: usize,
    pub report_dir: PathBuf,
    pub verifier: VerifierConfig,
}

impl MigratorConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `TARGET_DATABASE_URL`: PostgreSQL URL (required)
    /// - `SOURCE_DATABASE_URL`: SQLite URL (default: sqlite://prisma/dev.db)
    /// - `SCHEMA_PATH`: schema descriptor document (default: prisma/schema.prisma)
    /// - `MIGRATION_BATCH_SIZE`: rows per progress batch (default: 100)
    /// - `REPORT_DIR`: directory receiving the JSON reports (default: .)
    /// - `VERIFY_JSON_FIELDS`: comma-separated field-name regexes for structured text
    /// - `VERIFY_SAMPLE_LIMIT`: values sampled per field (default: 1000)
    /// - `VERIFY_MAX_MISMATCHES`: mismatch descriptions kept per check (default: 20)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let target_url = get(TARGET_DATABASE_URL).ok_or(ConfigError::Missing(TARGET_DATABASE_URL))?;
        if !(target_url.starts_with("postgres://") || target_url.starts_with("postgresql://")) {
            return Err(ConfigError::InvalidUrl {
                name: TARGET_DATABASE_URL,
                expected: "PostgreSQL",
            });
        }

        let source_url =
            get(SOURCE_DATABASE_URL).unwrap_or_else(|| DEFAULT_SOURCE_DATABASE_URL.to_string());
        if !source_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidUrl {
                name: SOURCE_DATABASE_URL,
                expected: "SQLite",
            });
        }

        let json_field_patterns = match get(VERIFY_JSON_FIELDS) {
            Some(list) => {
                let patterns: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
                if patterns.is_empty() {
                    return Err(ConfigError::EmptyPatternList(VERIFY_JSON_FIELDS));
                }
                patterns
            }
            None => DEFAULT_JSON_FIELD_PATTERNS.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Self {
            source_url,
            target_url,
            schema_path: get(SCHEMA_PATH)
                .unwrap_or_else(|| DEFAULT_SCHEMA_PATH.to_string())
                .into(),
            batch_size: positive(MIGRATION_BATCH_SIZE, get(MIGRATION_BATCH_SIZE), DEFAULT_BATCH_SIZE)?,
            report_dir: get(REPORT_DIR)
                .unwrap_or_else(|| DEFAULT_REPORT_DIR.to_string())
                .into(),
            verifier: VerifierConfig {
                json_field_patterns,
                sample_limit: positive(VERIFY_SAMPLE_LIMIT, get(VERIFY_SAMPLE_LIMIT), DEFAULT_SAMPLE_LIMIT)?,
                max_mismatches: positive(
                    VERIFY_MAX_MISMATCHES,
                    get(VERIFY_MAX_MISMATCHES),
                    DEFAULT_MAX_MISMATCHES,
                )?,
            },
        })
    }

    /// The target URL with any password replaced, for logging.
    pub fn redacted_target_url(&self) -> String {
        redact_password(&self.target_url)
    }
}

fn positive<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}

fn redact_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
