//! Nudge Core - Reminder parsing and recurrence resolution
//!
//! This crate contains pure domain logic with no I/O operations.
//! It turns raw reminder submissions into timezone-correct reminder
//! specifications and computes next occurrences for recurring reminders.
//! The caller supplies the user's timezone and the current instant; nothing
//! here reads a clock.

pub mod blocks;
pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod models;
pub mod parser;
pub mod priority;
pub mod recurrence;
pub mod time;
pub mod timezone;

pub use config::ParserConfig;
pub use error::{ConfigError, Field, ParseError, ReminderError};
pub use models::{
    NewReminder, Priority, RecurrenceKind, RecurrenceRule, ReminderSpec, ReminderStatus,
    UserContext,
};
pub use parser::{ReminderParser, parse};
pub use recurrence::{next_occurrence, next_occurrence_after, parse_recurrence, upcoming};
pub use timezone::{localize, parse_timezone, validate_timezone};
