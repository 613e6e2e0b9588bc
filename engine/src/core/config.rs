use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_HYBRID_THRESHOLD, DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE, DEFAULT_PARALLEL_MIN_RECORDS,
    ENV_HYBRID_THRESHOLD, ENV_MAX_DEPTH, ENV_PAGE_SIZE, ENV_PARALLEL_MIN_RECORDS,
    ENV_STRICT_FIELDS,
};

// =============================================================================
// Unknown Field Policy
// =============================================================================

/// What to do with a filter or sort key whose field path does not resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop the filter or sort key and continue
    #[default]
    Ignore,
    /// Fail the request
    Reject,
}

impl fmt::Display for UnknownFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownFieldPolicy::Ignore => write!(f, "ignore"),
            UnknownFieldPolicy::Reject => write!(f, "reject"),
        }
    }
}

// =============================================================================
// File Config (JSON deserialization)
// =============================================================================

/// Engine configuration as read from a JSON file; every field optional
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub max_depth: Option<usize>,
    pub default_page_size: Option<usize>,
    pub hybrid_threshold: Option<u64>,
    pub parallel_min_records: Option<usize>,
    pub unknown_fields: Option<UnknownFieldPolicy>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

/// Engine configuration: plain values supplied at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Maximum number of segments in a field path
    pub max_depth: usize,
    /// Page size used when the request carries a non-positive one
    pub default_page_size: usize,
    /// Estimated row count at or below which the hybrid path evaluates in memory
    pub hybrid_threshold: u64,
    /// Inputs smaller than this are filtered sequentially
    pub parallel_min_records: usize,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_page_size: DEFAULT_PAGE_SIZE,
            hybrid_threshold: DEFAULT_HYBRID_THRESHOLD,
            parallel_min_records: DEFAULT_PARALLEL_MIN_RECORDS,
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, falling back to defaults for absent keys
    pub fn load(path: &Path) -> Result<Self> {
        let file_config = FileConfig::load_from_file(path)?;
        file_config.warn_unknown_fields();
        Self::from_file_config(file_config)
    }

    /// Resolve a file config against the defaults
    pub fn from_file_config(file: FileConfig) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_depth: file.max_depth.unwrap_or(defaults.max_depth),
            default_page_size: file.default_page_size.unwrap_or(defaults.default_page_size),
            hybrid_threshold: file.hybrid_threshold.unwrap_or(defaults.hybrid_threshold),
            parallel_min_records: file
                .parallel_min_records
                .unwrap_or(defaults.parallel_min_records),
            unknown_fields: file.unknown_fields.unwrap_or(defaults.unknown_fields),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `FILTERKIT_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (environment, test maps)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_MAX_DEPTH) {
            self.max_depth = parse_override(ENV_MAX_DEPTH, &v)?;
        }
        if let Some(v) = lookup(ENV_PAGE_SIZE) {
            self.default_page_size = parse_override(ENV_PAGE_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_HYBRID_THRESHOLD) {
            self.hybrid_threshold = parse_override(ENV_HYBRID_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENV_PARALLEL_MIN_RECORDS) {
            self.parallel_min_records = parse_override(ENV_PARALLEL_MIN_RECORDS, &v)?;
        }
        if let Some(v) = lookup(ENV_STRICT_FIELDS) {
            let strict: bool = parse_override(ENV_STRICT_FIELDS, &v)?;
            self.unknown_fields = if strict {
                UnknownFieldPolicy::Reject
            } else {
                UnknownFieldPolicy::Ignore
            };
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            anyhow::bail!("max_depth must be at least 1");
        }
        if self.default_page_size == 0 {
            anyhow::bail!("default_page_size must be at least 1");
        }
        Ok(())
    }
}

fn parse_override<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("Invalid value for {}: {}", key, value))
}
