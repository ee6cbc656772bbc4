//! Core domain models for Nudge
//!
//! These models are the output of a parse call and the hand-off to the
//! storage and scheduling collaborators.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ReminderError, ReminderResult};
use crate::recurrence;
use crate::timezone::parse_timezone;

/// Reminder priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Marker shown next to a reminder in chat
    pub fn emoji(self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🟢",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ReminderError::InvalidPriority(s.trim().to_string())),
        }
    }
}

/// Unit a recurring reminder advances by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceKind {
    /// Name used by the reminders table (`day` | `week` | `month`)
    pub fn as_storage_str(self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
        }
    }
}

impl FromStr for RecurrenceKind {
    type Err = ReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Daily),
            "week" | "weekly" => Ok(Self::Weekly),
            "month" | "monthly" => Ok(Self::Monthly),
            _ => Err(ReminderError::RecurrenceParse(s.trim().to_string())),
        }
    }
}

/// Normalized repetition cadence: every `interval` units of `kind`
///
/// A reminder without recurrence carries `None` instead of a rule, so a
/// rule always has a meaningful interval of at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecurrenceRule {
    kind: RecurrenceKind,
    interval: u32,
}

impl RecurrenceRule {
    pub fn new(kind: RecurrenceKind, interval: u32) -> ReminderResult<Self> {
        if interval == 0 {
            return Err(ReminderError::RecurrenceParse(format!(
                "every 0 {}s",
                kind.as_storage_str()
            )));
        }
        Ok(Self { kind, interval })
    }

    pub fn daily() -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            interval: 1,
        }
    }

    pub fn weekly() -> Self {
        Self {
            kind: RecurrenceKind::Weekly,
            interval: 1,
        }
    }

    pub fn monthly() -> Self {
        Self {
            kind: RecurrenceKind::Monthly,
            interval: 1,
        }
    }

    /// Rebuild a rule from the `recurrence_type`/`recurrence_interval` columns
    pub fn from_storage(kind: &str, interval: Option<i64>) -> ReminderResult<Self> {
        let kind = kind.parse::<RecurrenceKind>()?;
        let interval = u32::try_from(interval.unwrap_or(1))
            .map_err(|_| ReminderError::RecurrenceParse(format!("interval {interval:?}")))?;
        Self::new(kind, interval)
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.kind
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// "Every N units" with N > 1
    pub fn is_custom(&self) -> bool {
        self.interval > 1
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.kind.as_storage_str();
        if self.interval == 1 {
            write!(f, "every {unit}")
        } else {
            write!(f, "every {} {unit}s", self.interval)
        }
    }
}

/// Caller-supplied context for one parse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// The user's timezone
    pub timezone: Tz,
    /// The instant the submission is parsed at
    pub now: DateTime<Utc>,
    /// Per-call override of the per-submission reminder cap
    pub max_reminders: Option<usize>,
}

impl UserContext {
    pub fn new(timezone: Tz, now: DateTime<Utc>) -> Self {
        Self {
            timezone,
            now,
            max_reminders: None,
        }
    }

    /// Build a context from an IANA timezone name
    pub fn from_iana(timezone: &str, now: DateTime<Utc>) -> ReminderResult<Self> {
        Ok(Self::new(parse_timezone(timezone)?, now))
    }

    pub fn with_max_reminders(mut self, max: usize) -> Self {
        self.max_reminders = Some(max);
        self
    }
}

/// A fully resolved reminder, ready for persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSpec {
    pub message: String,
    pub due_at: DateTime<Utc>,
    pub priority: Priority,
    pub recurrence: Option<RecurrenceRule>,
}

impl ReminderSpec {
    /// Wrap this spec as a new pending record owned by `owner_id`
    pub fn into_pending(self, owner_id: i64) -> NewReminder {
        NewReminder {
            id: Uuid::new_v4(),
            owner_id,
            spec: self,
            status: ReminderStatus::Pending,
            parent_id: None,
        }
    }
}

/// Lifecycle status of a stored reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A reminder record as handed to the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReminder {
    pub id: Uuid,
    pub owner_id: i64,
    #[serde(flatten)]
    pub spec: ReminderSpec,
    pub status: ReminderStatus,
    /// The occurrence this record was generated from, for recurring reminders
    pub parent_id: Option<Uuid>,
}

impl NewReminder {
    /// Build the pending record for the occurrence after this one
    ///
    /// Returns `Ok(None)` for one-off reminders.
    pub fn next_occurrence(&self, tz: &Tz) -> ReminderResult<Option<Self>> {
        let Some(rule) = self.spec.recurrence else {
            return Ok(None);
        };

        let due_at = recurrence::next_occurrence(&rule, self.spec.due_at, tz)?;

        Ok(Some(Self {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            spec: ReminderSpec {
                due_at,
                ..self.spec.clone()
            },
            status: ReminderStatus::Pending,
            parent_id: Some(self.id),
        }))
    }
}
