//! Error types for Nudge core domain logic

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while resolving a single reminder block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    #[error("Reminder message is empty")]
    EmptyMessage,

    #[error("Invalid priority '{0}': use high, medium or low")]
    InvalidPriority(String),

    #[error(
        "Could not parse time: {0}. Try formats like '9:00am', '14:30', 'tomorrow 3pm' or '25/02/2024'"
    )]
    TimeParse(String),

    #[error("Ambiguous time: {0}")]
    AmbiguousTime(String),

    #[error("Cannot set reminder for past time: {0}")]
    PastTime(String),

    #[error(
        "Could not parse recurrence '{0}'. Use daily, weekly, monthly or 'every N days/weeks/months'"
    )]
    RecurrenceParse(String),

    #[error("Too many reminders: {count} submitted, at most {max} allowed")]
    TooManyReminders { count: usize, max: usize },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Result type alias for single-block operations
pub type ReminderResult<T> = Result<T, ReminderError>;

/// Which part of a block an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Message,
    Priority,
    Time,
    Date,
    Repeat,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Priority => "priority",
            Self::Time => "time",
            Self::Date => "date",
            Self::Repeat => "repeat",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission-level failure: the first block that could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Reminder {} ({}): {source}", .block + 1, field_label(.field))]
pub struct ParseError {
    /// Zero-based index of the offending block
    pub block: usize,
    /// Field that failed, if the failure is tied to one
    pub field: Option<Field>,
    #[source]
    pub source: ReminderError,
}

fn field_label(field: &Option<Field>) -> &'static str {
    field.map_or("submission", Field::as_str)
}

impl ParseError {
    pub fn new(block: usize, field: Option<Field>, source: ReminderError) -> Self {
        Self {
            block,
            field,
            source,
        }
    }

    /// The underlying component error
    pub fn kind(&self) -> &ReminderError {
        &self.source
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}
