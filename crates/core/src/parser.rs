//! Reminder parser
//!
//! Turns one raw submission into fully resolved reminders. Blocks are
//! resolved independently, but the result is all-or-nothing: either every
//! block resolves or the first failing block is reported.

use crate::blocks::{self, Mode};
use crate::config::ParserConfig;
use crate::error::{Field, ParseError, ReminderError};
use crate::fields::{self, RawFields};
use crate::models::{ReminderSpec, UserContext};
use crate::priority;
use crate::recurrence::parse_recurrence;
use crate::time::{self, TimeExpression, parse_clock, parse_day};

/// Parses submissions using a fixed set of defaults
#[derive(Debug, Clone, Default)]
pub struct ReminderParser {
    config: ParserConfig,
}

impl ReminderParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a submission into one reminder per block, in submission order
    ///
    /// # Errors
    ///
    /// Returns the first block that fails, tagged with its index and field.
    pub fn parse(&self, text: &str, ctx: &UserContext) -> Result<Vec<ReminderSpec>, ParseError> {
        let submission = blocks::split(text);
        let max = ctx.max_reminders.unwrap_or(self.config.max_reminders);
        let count = submission.blocks.len();

        if count > max {
            tracing::warn!(count, max, "submission rejected: too many reminders");
            return Err(ParseError::new(
                max,
                None,
                ReminderError::TooManyReminders { count, max },
            ));
        }

        let (shared, _) = fields::extract_labels(&submission.header);

        let specs = submission
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| self.resolve_block(index, block, submission.mode, &shared, ctx))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| {
                tracing::warn!(
                    block = e.block,
                    field = ?e.field,
                    "submission rejected: {}",
                    e.source
                );
            })?;

        tracing::info!(
            count = specs.len(),
            mode = ?submission.mode,
            timezone = ctx.timezone.name(),
            "parsed reminder submission"
        );

        Ok(specs)
    }

    fn resolve_block(
        &self,
        index: usize,
        block: &str,
        mode: Mode,
        shared: &RawFields,
        ctx: &UserContext,
    ) -> Result<ReminderSpec, ParseError> {
        let fail = |field: Field| {
            move |source: ReminderError| ParseError::new(index, Some(field), source)
        };

        let (message, raw) = fields::extract(block, mode).map_err(fail(Field::Message))?;
        let raw = raw.with_defaults(shared);

        tracing::debug!(
            block = index,
            ?mode,
            priority = ?raw.priority,
            time = ?raw.time,
            date = ?raw.date,
            repeat = ?raw.repeat,
            "extracted reminder fields"
        );

        let priority = priority::classify(&raw).map_err(fail(Field::Priority))?;

        let expr = TimeExpression {
            day: raw.date.as_deref().map(parse_day).transpose().map_err(fail(Field::Date))?,
            clock: raw.time.as_deref().map(parse_clock).transpose().map_err(fail(Field::Time))?,
        };

        let due_at = time::resolve(&expr, ctx, self.config.default_time).map_err(|source| {
            let field = match (&source, expr.day) {
                (ReminderError::PastTime(_), Some(_)) => Field::Date,
                _ => Field::Time,
            };
            ParseError::new(index, Some(field), source)
        })?;

        let recurrence = raw
            .repeat
            .as_deref()
            .map(parse_recurrence)
            .transpose()
            .map_err(fail(Field::Repeat))?
            .flatten();

        Ok(ReminderSpec {
            message,
            due_at,
            priority,
            recurrence,
        })
    }
}

/// Parse a submission with the default configuration
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use nudge_core::{parse, Priority, UserContext};
///
/// let now = Utc.with_ymd_and_hms(2024, 2, 24, 9, 0, 0).unwrap();
/// let ctx = UserContext::from_iana("Europe/Madrid", now).unwrap();
///
/// let specs = parse("remind me tomorrow at 3pm to call mom", &ctx).unwrap();
/// assert_eq!(specs.len(), 1);
/// assert_eq!(specs[0].message, "call mom");
/// assert_eq!(specs[0].priority, Priority::Medium);
/// assert_eq!(specs[0].due_at, Utc.with_ymd_and_hms(2024, 2, 25, 14, 0, 0).unwrap());
/// ```
pub fn parse(text: &str, ctx: &UserContext) -> Result<Vec<ReminderSpec>, ParseError> {
    ReminderParser::default().parse(text, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn ctx() -> UserContext {
        UserContext::new(chrono_tz::UTC, Utc.with_ymd_and_hms(2024, 2, 24, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_error_tagged_with_block_and_field() {
        let text = "reminder\ntime: 9am\nTake medicine\n\ntime: 25pm\nDoctor";
        let err = parse(text, &ctx()).unwrap_err();
        assert_eq!(err.block, 1);
        assert_eq!(err.field, Some(Field::Time));
        assert!(matches!(err.source, ReminderError::TimeParse(_)));
    }

    #[test]
    fn test_too_many_reminders_uses_context_cap() {
        let text = "reminder\ntime: 9am\nOne\n\ntime: 10am\nTwo\n\ntime: 11am\nThree";
        let ctx = ctx().with_max_reminders(2);
        let err = parse(text, &ctx).unwrap_err();
        assert_eq!(err.block, 2);
        assert_eq!(err.field, None);
        assert_eq!(err.source, ReminderError::TooManyReminders { count: 3, max: 2 });
    }

    #[test]
    fn test_custom_default_time() {
        let parser = ReminderParser::new(ParserConfig {
            default_time: NaiveTime::from_hms_opt(7, 15, 0).unwrap(),
            ..ParserConfig::default()
        });
        let specs = parser.parse("stretch tomorrow", &ctx()).unwrap();
        assert_eq!(specs[0].due_at, Utc.with_ymd_and_hms(2024, 2, 25, 7, 15, 0).unwrap());
    }

    #[test]
    fn test_past_explicit_date_reports_date_field() {
        let err = parse("reminder\ndate: 20/02/2024\ntime: 9am\nPay rent", &ctx()).unwrap_err();
        assert_eq!(err.field, Some(Field::Date));
        assert!(matches!(err.source, ReminderError::PastTime(_)));
    }

    #[test]
    fn test_invalid_priority_field() {
        let err = parse("reminder\npriority: asap\ntime: 9am\nPay rent", &ctx()).unwrap_err();
        assert_eq!(err.block, 0);
        assert_eq!(err.field, Some(Field::Priority));
    }

    #[test]
    fn test_repeat_none_yields_no_rule() {
        let specs = parse("reminder\ntime: 9am\nrepeat: none\nPay rent", &ctx()).unwrap();
        assert_eq!(specs[0].recurrence, None);
        assert_eq!(specs[0].priority, Priority::Medium);
    }
}
