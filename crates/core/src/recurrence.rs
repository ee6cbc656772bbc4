//! Recurrence rule parsing and next-occurrence computation
//!
//! Recurrence phrases ("daily", "every 3 weeks") normalize into a
//! [`RecurrenceRule`]. Occurrences advance in the user's local calendar and
//! are converted back to UTC with the offset in force at the new wall-clock
//! time, so a 09:00 reminder stays at 09:00 across DST changes.

use chrono::{DateTime, Days, Months, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ReminderError, ReminderResult};
use crate::models::{RecurrenceKind, RecurrenceRule};
use crate::timezone::{localize, to_local};

static EVERY_N: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^every\s+(\d+)\s+(day|week|month)(?:s|\(s\))?$").expect("valid regex")
});

static EVERY_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^every\s+(day|week|month)$").expect("valid regex"));

/// Upper bound on catch-up iterations in [`next_occurrence_after`]
const MAX_CATCH_UP_STEPS: usize = 10_000;

/// Parse a repeat phrase into a rule
///
/// Returns `Ok(None)` for phrases meaning "no repetition" (`none`, `never`,
/// `once`).
///
/// # Examples
///
/// ```
/// use nudge_core::models::{RecurrenceKind, RecurrenceRule};
/// use nudge_core::recurrence::parse_recurrence;
///
/// assert_eq!(parse_recurrence("every week").unwrap(), Some(RecurrenceRule::weekly()));
///
/// let rule = parse_recurrence("every 2 days").unwrap().unwrap();
/// assert_eq!(rule.kind(), RecurrenceKind::Daily);
/// assert_eq!(rule.interval(), 2);
/// ```
pub fn parse_recurrence(raw: &str) -> ReminderResult<Option<RecurrenceRule>> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

    match normalized.as_str() {
        "none" | "never" | "once" | "no" => return Ok(None),
        "daily" => return Ok(Some(RecurrenceRule::daily())),
        "weekly" => return Ok(Some(RecurrenceRule::weekly())),
        "monthly" => return Ok(Some(RecurrenceRule::monthly())),
        _ => {}
    }

    if let Some(caps) = EVERY_UNIT.captures(&normalized) {
        let kind = caps[1].parse::<RecurrenceKind>()?;
        return RecurrenceRule::new(kind, 1).map(Some);
    }

    if let Some(caps) = EVERY_N.captures(&normalized) {
        let interval = caps[1]
            .parse::<u32>()
            .map_err(|_| ReminderError::RecurrenceParse(raw.trim().to_string()))?;
        let kind = caps[2].parse::<RecurrenceKind>()?;
        return RecurrenceRule::new(kind, interval)
            .map(Some)
            .map_err(|_| ReminderError::RecurrenceParse(raw.trim().to_string()));
    }

    Err(ReminderError::RecurrenceParse(raw.trim().to_string()))
}

/// Compute the occurrence after `anchor`
///
/// Daily rules advance by `interval` calendar days, weekly by
/// `interval * 7` days and monthly by `interval` calendar months with the
/// day of month clamped to the target month's length (Jan 31 -> Feb 28/29).
/// Identical inputs always give identical outputs.
///
/// # Errors
///
/// Fails with [`ReminderError::AmbiguousTime`] when the new wall-clock time
/// falls in a spring-forward gap, or [`ReminderError::TimeParse`] when the
/// date leaves chrono's supported range.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    tz: &Tz,
) -> ReminderResult<DateTime<Utc>> {
    let local = to_local(&anchor, tz);
    let next = advance(local, rule).ok_or_else(|| {
        ReminderError::TimeParse(format!("{rule} after {anchor} is out of range"))
    })?;
    localize(tz, next)
}

fn advance(local: NaiveDateTime, rule: &RecurrenceRule) -> Option<NaiveDateTime> {
    let interval = rule.interval();
    match rule.kind() {
        RecurrenceKind::Daily => local.checked_add_days(Days::new(u64::from(interval))),
        RecurrenceKind::Weekly => local.checked_add_days(Days::new(u64::from(interval) * 7)),
        // checked_add_months clamps the day to the last day of the target month
        RecurrenceKind::Monthly => local.checked_add_months(Months::new(interval)),
    }
}

/// First occurrence strictly after `after`, for catching up on missed reminders
///
/// Returns `Ok(None)` when that occurrence would fall after `until`.
pub fn next_occurrence_after(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    tz: &Tz,
    after: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
) -> ReminderResult<Option<DateTime<Utc>>> {
    let mut current = next_occurrence(rule, anchor, tz)?;
    let mut steps = 0;

    while current <= after {
        steps += 1;
        if steps > MAX_CATCH_UP_STEPS {
            return Err(ReminderError::TimeParse(format!(
                "{rule} from {anchor} does not reach {after}"
            )));
        }
        current = next_occurrence(rule, current, tz)?;
    }

    match until {
        Some(end) if current > end => Ok(None),
        _ => Ok(Some(current)),
    }
}

/// The next `count` occurrences after `anchor`, in order
pub fn upcoming(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    tz: &Tz,
    count: usize,
) -> ReminderResult<Vec<DateTime<Utc>>> {
    let mut occurrences = Vec::with_capacity(count);
    let mut current = anchor;

    for _ in 0..count {
        current = next_occurrence(rule, current, tz)?;
        occurrences.push(current);
    }

    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::{America, Europe, UTC};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_recurrence_keywords() {
        assert_eq!(parse_recurrence("daily").unwrap(), Some(RecurrenceRule::daily()));
        assert_eq!(parse_recurrence("Every Day").unwrap(), Some(RecurrenceRule::daily()));
        assert_eq!(parse_recurrence("WEEKLY").unwrap(), Some(RecurrenceRule::weekly()));
        assert_eq!(parse_recurrence("every week").unwrap(), Some(RecurrenceRule::weekly()));
        assert_eq!(parse_recurrence("monthly").unwrap(), Some(RecurrenceRule::monthly()));
        assert_eq!(parse_recurrence("every  month").unwrap(), Some(RecurrenceRule::monthly()));
    }

    #[test]
    fn test_parse_recurrence_every_n() {
        let rule = parse_recurrence("every 2 days").unwrap().unwrap();
        assert_eq!(rule.kind(), RecurrenceKind::Daily);
        assert_eq!(rule.interval(), 2);

        let rule = parse_recurrence("every 3 weeks").unwrap().unwrap();
        assert_eq!(rule.kind(), RecurrenceKind::Weekly);
        assert_eq!(rule.interval(), 3);

        let rule = parse_recurrence("every 1 month(s)").unwrap().unwrap();
        assert_eq!(rule, RecurrenceRule::monthly());
    }

    #[test]
    fn test_parse_recurrence_none() {
        assert_eq!(parse_recurrence("none").unwrap(), None);
        assert_eq!(parse_recurrence("Never").unwrap(), None);
    }

    #[test]
    fn test_parse_recurrence_invalid() {
        for raw in ["every 0 days", "fortnightly", "every -2 days", "every 2 years", ""] {
            assert!(
                matches!(parse_recurrence(raw), Err(ReminderError::RecurrenceParse(_))),
                "expected failure for {raw:?}"
            );
        }
    }

    #[test]
    fn test_next_occurrence_daily_and_weekly() {
        let anchor = utc(2024, 3, 1, 9, 0);
        let rule = RecurrenceRule::new(RecurrenceKind::Daily, 2).unwrap();
        assert_eq!(next_occurrence(&rule, anchor, &UTC).unwrap(), utc(2024, 3, 3, 9, 0));

        let rule = RecurrenceRule::new(RecurrenceKind::Weekly, 2).unwrap();
        assert_eq!(next_occurrence(&rule, anchor, &UTC).unwrap(), utc(2024, 3, 15, 9, 0));
    }

    #[test]
    fn test_monthly_clamps_to_short_month() {
        let rule = RecurrenceRule::monthly();

        // Leap year
        let next = next_occurrence(&rule, utc(2024, 1, 31, 9, 0), &UTC).unwrap();
        assert_eq!(next, utc(2024, 2, 29, 9, 0));

        // Non-leap year
        let next = next_occurrence(&rule, utc(2023, 1, 31, 9, 0), &UTC).unwrap();
        assert_eq!(next, utc(2023, 2, 28, 9, 0));

        // Interval crossing a year boundary
        let rule = RecurrenceRule::new(RecurrenceKind::Monthly, 13).unwrap();
        let next = next_occurrence(&rule, utc(2023, 12, 31, 9, 0), &UTC).unwrap();
        assert_eq!(next, utc(2025, 1, 31, 9, 0));
    }

    #[test]
    fn test_next_occurrence_keeps_wall_clock_across_dst() {
        // 09:00 in Madrid: UTC+1 before 31 March, UTC+2 after
        let anchor = utc(2024, 3, 30, 8, 0);
        let next = next_occurrence(&RecurrenceRule::daily(), anchor, &Europe::Madrid).unwrap();
        assert_eq!(next, utc(2024, 3, 31, 7, 0));
    }

    #[test]
    fn test_next_occurrence_into_dst_gap_fails() {
        // 02:30 New York local on 9 March 2024; 10 March skips 02:00-03:00
        let anchor = utc(2024, 3, 9, 7, 30);
        let result = next_occurrence(&RecurrenceRule::daily(), anchor, &America::New_York);
        assert!(matches!(result, Err(ReminderError::AmbiguousTime(_))));
    }

    #[test]
    fn test_next_occurrence_is_repeatable_and_chains() {
        let rule = RecurrenceRule::new(RecurrenceKind::Weekly, 1).unwrap();
        let anchor = utc(2024, 10, 20, 8, 0);

        let first = next_occurrence(&rule, anchor, &Europe::Madrid).unwrap();
        assert_eq!(first, next_occurrence(&rule, anchor, &Europe::Madrid).unwrap());

        let second = next_occurrence(&rule, first, &Europe::Madrid).unwrap();
        let local_first = to_local(&first, &Europe::Madrid);
        let local_second = to_local(&second, &Europe::Madrid);
        assert_eq!((local_second - local_first).num_days(), 7);
        assert_eq!(local_first.time(), local_second.time());
    }

    #[test]
    fn test_upcoming() {
        let rule = RecurrenceRule::monthly();
        let dates = upcoming(&rule, utc(2024, 1, 31, 9, 0), &UTC, 3).unwrap();
        assert_eq!(
            dates,
            vec![utc(2024, 2, 29, 9, 0), utc(2024, 3, 29, 9, 0), utc(2024, 4, 29, 9, 0)]
        );
    }

    #[test]
    fn test_next_occurrence_after_catches_up() {
        let rule = RecurrenceRule::daily();
        let anchor = utc(2024, 3, 1, 9, 0);
        let now = utc(2024, 3, 5, 12, 0);

        let next = next_occurrence_after(&rule, anchor, &UTC, now, None).unwrap();
        assert_eq!(next, Some(utc(2024, 3, 6, 9, 0)));
    }

    #[test]
    fn test_next_occurrence_after_respects_end() {
        let rule = RecurrenceRule::weekly();
        let anchor = utc(2024, 3, 1, 9, 0);
        let end = utc(2024, 3, 5, 0, 0);

        let next = next_occurrence_after(&rule, anchor, &UTC, anchor, Some(end)).unwrap();
        assert_eq!(next, None);
    }
}
