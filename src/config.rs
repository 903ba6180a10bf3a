use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_HORIZON_DAYS: u32 = 365;
const DEFAULT_WARNING_PERCENT: f64 = 90.0;
const DEFAULT_CACHE_CAPACITY: usize = 256;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Tunables for the allocation calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerConfig {
    /// How far past `max(project start, today)` a continuous project is
    /// considered to run when spreading its budget.
    pub continuous_horizon_days: u32,
    /// Utilization (percent) above which budget checks emit a warning.
    pub budget_warning_percent: f64,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl_seconds: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            continuous_horizon_days: DEFAULT_HORIZON_DAYS,
            budget_warning_percent: DEFAULT_WARNING_PERCENT,
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded planner configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.continuous_horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "continuousHorizonDays must be at least 1".to_string(),
            ));
        }
        if !self.budget_warning_percent.is_finite()
            || self.budget_warning_percent < 0.0
            || self.budget_warning_percent > 100.0
        {
            return Err(ConfigError::Invalid(format!(
                "budgetWarningPercent must be between 0 and 100 (got {})",
                self.budget_warning_percent
            )));
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache capacity must be non-zero when caching is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
