//! Parser configuration
//!
//! Handles loading of the parser defaults from environment variables.

use crate::error::ConfigError;
use crate::timezone::parse_timezone;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;

/// Clock time used when a reminder names no time of day
pub const DEFAULT_TIME: (u32, u32) = (9, 0);

/// Per-submission reminder cap used when nothing else is configured
pub const DEFAULT_MAX_REMINDERS: usize = 10;

/// Defaults applied by the reminder parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Clock time for reminders without an explicit time (default: 09:00)
    pub default_time: NaiveTime,

    /// Maximum number of reminders in one submission (default: 10)
    pub max_reminders: usize,

    /// Timezone for users who have not picked one (default: UTC)
    pub default_timezone: Tz,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let (hour, minute) = DEFAULT_TIME;
        Self {
            default_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
            max_reminders: DEFAULT_MAX_REMINDERS,
            default_timezone: Tz::UTC,
        }
    }
}

impl ParserConfig {
    /// Load parser configuration from environment variables
    ///
    /// This will also initialize dotenv if it hasn't been done yet.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let default_time = match env::var("REMINDER_DEFAULT_TIME") {
            Ok(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|_| invalid("REMINDER_DEFAULT_TIME", &value))?,
            Err(_) => defaults.default_time,
        };

        let max_reminders = match env::var("REMINDER_MAX_PER_SUBMISSION") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(max) if max > 0 => max,
                _ => return Err(invalid("REMINDER_MAX_PER_SUBMISSION", &value)),
            },
            Err(_) => defaults.max_reminders,
        };

        let default_timezone = match env::var("DEFAULT_TIMEZONE") {
            Ok(value) => {
                parse_timezone(value.trim()).map_err(|_| invalid("DEFAULT_TIMEZONE", &value))?
            }
            Err(_) => defaults.default_timezone,
        };

        Ok(Self {
            default_time,
            max_reminders,
            default_timezone,
        })
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    }
}
