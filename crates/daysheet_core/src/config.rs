//! Schedule configuration.
//!
//! # Responsibility
//! - Describe the step, the initial window and the reflow policy.
//! - Load configuration from JSON and validate it before use.
//!
//! # Invariants
//! - A validated config has a step that divides the day.
//! - A validated window is step aligned, inside the day and at least one
//!   step wide.

use crate::model::time::{TimeOfDay, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_STEP_MINUTES: u32 = 30;
pub const DEFAULT_WINDOW_START: TimeOfDay = TimeOfDay::from_hm(8, 0);
pub const DEFAULT_WINDOW_END: TimeOfDay = TimeOfDay::from_hm(19, 0);

/// How a block boundary edit propagates to the following blocks.
///
/// A schedule runs exactly one policy for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflowPolicy {
    /// Re-tile every following block at step width after the edited one.
    #[default]
    Cascade,
    /// Only move the next block's start to the edited block's new end.
    AlignNext,
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Json(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(details) => write!(f, "invalid config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Schedule settings, serialized as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    pub step_minutes: u32,
    pub window_start: TimeOfDay,
    pub window_end: TimeOfDay,
    pub reflow_policy: ReflowPolicy,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            step_minutes: DEFAULT_STEP_MINUTES,
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            reflow_policy: ReflowPolicy::default(),
        }
    }
}

impl ScheduleConfig {
    pub fn with_step(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    pub fn with_window(mut self, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    pub fn with_policy(mut self, policy: ReflowPolicy) -> Self {
        self.reflow_policy = policy;
        self
    }

    /// Checks step and window constraints.
    ///
    /// # Errors
    /// - Returns `ConfigError::Invalid` naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.step_minutes;
        if step == 0 {
            return Err(ConfigError::Invalid("stepMinutes must be > 0".to_string()));
        }
        if MINUTES_PER_DAY % step != 0 {
            return Err(ConfigError::Invalid(format!(
                "stepMinutes must divide a day, got {step}"
            )));
        }
        for (name, value) in [
            ("windowStart", self.window_start),
            ("windowEnd", self.window_end),
        ] {
            if value > TimeOfDay::END_OF_DAY {
                return Err(ConfigError::Invalid(format!("{name} {value} is past 24:00")));
            }
            if value.minutes() % step != 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} {value} is not aligned to {step} minute steps"
                )));
            }
        }
        if self.window_end.minutes() < self.window_start.minutes() + step {
            return Err(ConfigError::Invalid(format!(
                "window {}-{} must span at least one step",
                self.window_start, self.window_end
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ReflowPolicy, ScheduleConfig};
    use crate::model::time::TimeOfDay;

    #[test]
    fn default_config_is_valid() {
        let config = ScheduleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step_minutes, 30);
        assert_eq!(config.window_start, TimeOfDay::from_hm(8, 0));
        assert_eq!(config.window_end, TimeOfDay::from_hm(19, 0));
        assert_eq!(config.reflow_policy, ReflowPolicy::Cascade);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ScheduleConfig::from_json_str(r#"{"stepMinutes": 15}"#)
            .expect("partial config should load");
        assert_eq!(config.step_minutes, 15);
        assert_eq!(config.window_start, TimeOfDay::from_hm(8, 0));
    }

    #[test]
    fn json_uses_camel_case_and_snake_case_policy() {
        let config = ScheduleConfig::from_json_str(
            r#"{"windowStart": "06:00", "windowEnd": "12:00", "reflowPolicy": "align_next"}"#,
        )
        .expect("config should load");
        assert_eq!(config.window_start, TimeOfDay::from_hm(6, 0));
        assert_eq!(config.reflow_policy, ReflowPolicy::AlignNext);
    }

    #[test]
    fn validate_rejects_bad_step_and_window() {
        let zero_step = ScheduleConfig::default().with_step(0);
        assert!(matches!(zero_step.validate(), Err(ConfigError::Invalid(_))));

        let odd_step = ScheduleConfig::default().with_step(7);
        assert!(matches!(odd_step.validate(), Err(ConfigError::Invalid(_))));

        let misaligned = ScheduleConfig::default()
            .with_window(TimeOfDay::from_hm(8, 10), TimeOfDay::from_hm(19, 0));
        assert!(matches!(misaligned.validate(), Err(ConfigError::Invalid(_))));

        let collapsed = ScheduleConfig::default()
            .with_window(TimeOfDay::from_hm(9, 0), TimeOfDay::from_hm(9, 0));
        let err = collapsed.validate().expect_err("empty window must be rejected");
        assert!(err.to_string().contains("at least one step"));
    }

    #[test]
    fn bad_time_string_is_a_json_error() {
        let err = ScheduleConfig::from_json_str(r#"{"windowStart": "8 o'clock"}"#)
            .expect_err("bad time must fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
