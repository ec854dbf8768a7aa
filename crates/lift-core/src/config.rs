//! Workout configuration

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the session store, timers and exercise library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutConfig {
    /// Rest countdown length restored after every alarm
    pub rest_default_secs: u32,
    /// How many times the rest alarm is played
    pub alarm_repeats: u32,
    /// Start the rest timer when a set is completed
    pub auto_rest: bool,
    /// Tick period of every timer, in milliseconds
    pub tick_period_ms: u64,
    /// How long a validation flash stays visible, in ticks
    pub flash_secs: u32,
    /// Length of the recently-used exercise list
    pub recent_limit: usize,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl WorkoutConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML, falling back to defaults for absent keys
    ///
    /// # Errors
    /// `CoreError::Config` on malformed TOML or invalid values
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(input).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// With rest default
    #[inline]
    #[must_use]
    pub fn with_rest_default(mut self, secs: u32) -> Self {
        self.rest_default_secs = secs;
        self
    }

    /// With alarm repeats
    #[inline]
    #[must_use]
    pub fn with_alarm_repeats(mut self, repeats: u32) -> Self {
        self.alarm_repeats = repeats;
        self
    }

    /// With auto rest
    #[inline]
    #[must_use]
    pub fn with_auto_rest(mut self, enabled: bool) -> Self {
        self.auto_rest = enabled;
        self
    }

    /// With recent limit
    #[inline]
    #[must_use]
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Tick period as a duration
    #[inline]
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Reject values the timers cannot run with
    ///
    /// # Errors
    /// `CoreError::Config` naming the offending key
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.rest_default_secs == 0 {
            return Err(CoreError::Config("rest_default_secs must be > 0".to_string()));
        }
        if self.alarm_repeats == 0 {
            return Err(CoreError::Config("alarm_repeats must be > 0".to_string()));
        }
        if self.tick_period_ms == 0 {
            return Err(CoreError::Config("tick_period_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            rest_default_secs: 120,
            alarm_repeats: 3,
            auto_rest: true,
            tick_period_ms: 1000,
            flash_secs: 2,
            recent_limit: 10,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = WorkoutConfig::from_toml_str("rest_default_secs = 90\njson_logs = true").unwrap();
        assert_eq!(config.rest_default_secs, 90);
        assert!(config.json_logs);
        assert_eq!(config.alarm_repeats, 3);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
    }

    #[test]
    fn zero_values_rejected() {
        assert!(WorkoutConfig::from_toml_str("tick_period_ms = 0").is_err());
        assert!(WorkoutConfig::new().with_rest_default(0).validate().is_err());
        assert!(WorkoutConfig::new().with_alarm_repeats(0).validate().is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = WorkoutConfig::from_toml_str("rest_default_secs = \"long\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
