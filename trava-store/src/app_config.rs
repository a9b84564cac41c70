use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use trava_core::package::CommissionPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Tunables for the search pipeline, passed into the orchestrator and
/// supervisor at construction.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchRules {
    pub commission_rate: f64,
    pub commission_policy: CommissionPolicy,
    #[serde(default = "default_min_stay_hours")]
    pub min_stay_hours: i64,
    #[serde(default = "default_retention_hours")]
    pub retention_hours: i64,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_seconds: u64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Retries per failed check before the sweep leaves a record for
    /// manual handling. `None` retries indefinitely.
    #[serde(default)]
    pub max_retry_count: Option<u32>,
}

fn default_min_stay_hours() -> i64 {
    24
}

fn default_retention_hours() -> i64 {
    24
}

fn default_retry_interval() -> u64 {
    900
}

fn default_cleanup_interval() -> u64 {
    3600
}

impl Default for SearchRules {
    fn default() -> Self {
        Self {
            commission_rate: 0.10,
            commission_policy: CommissionPolicy::Percentage,
            min_stay_hours: default_min_stay_hours(),
            retention_hours: default_retention_hours(),
            retry_interval_seconds: default_retry_interval(),
            cleanup_interval_seconds: default_cleanup_interval(),
            max_retry_count: None,
        }
    }
}

impl SearchRules {
    /// Reject rates with no decimal representation (NaN, infinities,
    /// out-of-range values). Called by `Config::load`, so a bad rate
    /// fails at startup instead of silently pricing at 0%.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        Decimal::try_from(self.commission_rate).map_err(|e| {
            config::ConfigError::Message(format!(
                "commission_rate {} is not a valid decimal: {e}",
                self.commission_rate
            ))
        })?;
        Ok(())
    }

    /// Rates are validated at load time; see `validate`.
    pub fn commission(&self) -> Decimal {
        Decimal::try_from(self.commission_rate).unwrap_or_default()
    }

    pub fn min_stay(&self) -> Duration {
        Duration::hours(self.min_stay_hours)
    }

    pub fn retention(&self) -> Duration {
        Duration::hours(self.retention_hours)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of TRAVA)
            // Eg.. `TRAVA_DEBUG=1` would set the `debug` key
            .add_source(config::Environment::with_prefix("TRAVA").separator("__"))
            .build()?;

        let cfg: Self = s.try_deserialize()?;
        cfg.search.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let rules = SearchRules::default();
        assert_eq!(rules.commission(), Decimal::new(10, 2));
        assert_eq!(rules.min_stay(), Duration::hours(24));
        assert_eq!(rules.cleanup_interval_seconds, 3600);
        assert!(rules.max_retry_count.is_none());
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_unrepresentable_commission_rate_rejected() {
        let mut rules = SearchRules::default();

        rules.commission_rate = f64::NAN;
        assert!(rules.validate().is_err());

        rules.commission_rate = f64::INFINITY;
        assert!(rules.validate().is_err());
    }
}
