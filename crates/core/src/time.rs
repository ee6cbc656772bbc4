//! Time resolution
//!
//! Turns a clock phrase and a day phrase into an absolute UTC instant in the
//! user's timezone. Day phrases take a fixed day/month/year order; two-digit
//! years are rejected rather than guessed.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ReminderError, ReminderResult};
use crate::models::UserContext;
use crate::timezone::{localize, to_local};

static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:[:.](\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)$").expect("valid regex")
});

static TWENTY_FOUR_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:[:.](\d{2}))?$").expect("valid regex"));

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})[/.-](\d{1,2})(?:[/.-](\d{1,4}))?$").expect("valid regex")
});

/// A day reference, not yet anchored to a calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRef {
    Today,
    Tomorrow,
    /// A fixed number of days from today ("next week")
    InDays(u64),
    /// The next occurrence of a weekday; `skip_today` for "next friday"
    Weekday { day: Weekday, skip_today: bool },
    /// A full calendar date
    Date(NaiveDate),
    /// Day and month in the user's current year
    DayMonth { day: u32, month: u32 },
}

impl DayRef {
    /// Whether the user pinned a calendar date rather than a relative day
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Date(_) | Self::DayMonth { .. })
    }
}

/// A parsed but unresolved time reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeExpression {
    pub day: Option<DayRef>,
    pub clock: Option<NaiveTime>,
}

fn hm(hour: u32, minute: u32) -> ReminderResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        ReminderError::TimeParse(format!("{hour:02}:{minute:02} is not a valid time"))
    })
}

/// Parse a clock phrase: `9am`, `9:30 pm`, `14:30`, `18.30`, `14`, or a named time
/// of day (`morning`, `noon`, `afternoon`, `evening`, `night`, `midnight`)
pub fn parse_clock(raw: &str) -> ReminderResult<NaiveTime> {
    let text = raw.trim().to_lowercase();
    let text = text.strip_prefix("at ").unwrap_or(&text).trim();

    match text {
        "morning" => return hm(9, 0),
        "noon" | "midday" => return hm(12, 0),
        "afternoon" => return hm(14, 0),
        "evening" => return hm(18, 0),
        "night" | "tonight" => return hm(20, 0),
        "midnight" => return hm(0, 0),
        _ => {}
    }

    if let Some(caps) = TWELVE_HOUR.captures(text) {
        let hour: u32 = caps[1].parse().map_err(|_| bad_clock(raw))?;
        let minute: u32 = caps
            .get(2)
            .map_or(Ok(0), |m| m.as_str().parse())
            .map_err(|_| bad_clock(raw))?;
        if !(1..=12).contains(&hour) {
            return Err(ReminderError::TimeParse(format!(
                "'{}' is not a 12-hour clock time",
                raw.trim()
            )));
        }
        let pm = caps[3].starts_with('p');
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return hm(hour, minute);
    }

    if let Some(caps) = TWENTY_FOUR_HOUR.captures(text) {
        let hour: u32 = caps[1].parse().map_err(|_| bad_clock(raw))?;
        let minute: u32 = caps
            .get(2)
            .map_or(Ok(0), |m| m.as_str().parse())
            .map_err(|_| bad_clock(raw))?;
        return hm(hour, minute);
    }

    Err(bad_clock(raw))
}

fn bad_clock(raw: &str) -> ReminderError {
    ReminderError::TimeParse(format!("'{}' is not a recognised time", raw.trim()))
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Parse a day phrase: `today`, `tomorrow`, `next week`, a weekday,
/// `DD/MM/YYYY`, `DD/MM` or `YYYY-MM-DD`
pub fn parse_day(raw: &str) -> ReminderResult<DayRef> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let text = text.strip_prefix("on ").unwrap_or(&text);

    match text {
        "today" | "tonight" => return Ok(DayRef::Today),
        "tomorrow" | "tmr" | "tmrw" => return Ok(DayRef::Tomorrow),
        "next week" => return Ok(DayRef::InDays(7)),
        _ => {}
    }

    if let Some(name) = text.strip_prefix("next ") {
        if let Some(day) = parse_weekday(name) {
            return Ok(DayRef::Weekday {
                day,
                skip_today: true,
            });
        }
    }
    let name = text.strip_prefix("this ").unwrap_or(text);
    if let Some(day) = parse_weekday(name) {
        return Ok(DayRef::Weekday {
            day,
            skip_today: false,
        });
    }

    if let Some(caps) = NUMERIC_DATE.captures(text) {
        return parse_numeric_date(raw, &caps[1], &caps[2], caps.get(3).map(|m| m.as_str()));
    }

    Err(ReminderError::TimeParse(format!(
        "'{}' is not a recognised date; use DD/MM/YYYY",
        raw.trim()
    )))
}

fn parse_numeric_date(
    raw: &str,
    first: &str,
    second: &str,
    third: Option<&str>,
) -> ReminderResult<DayRef> {
    let invalid = || {
        ReminderError::TimeParse(format!("'{}' is not a valid calendar date", raw.trim()))
    };
    let number = |part: &str| part.parse::<u32>().map_err(|_| invalid());

    // YYYY-MM-DD
    if first.len() == 4 {
        let Some(day) = third.filter(|d| d.len() <= 2) else {
            return Err(invalid());
        };
        let year = i32::try_from(number(first)?).map_err(|_| invalid())?;
        return NaiveDate::from_ymd_opt(year, number(second)?, number(day)?)
            .map(DayRef::Date)
            .ok_or_else(invalid);
    }

    if first.len() > 2 {
        return Err(invalid());
    }

    let day = number(first)?;
    let month = number(second)?;

    match third {
        None => {
            if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
                return Err(invalid());
            }
            Ok(DayRef::DayMonth { day, month })
        }
        Some(year) if year.len() == 2 => Err(ReminderError::AmbiguousTime(format!(
            "two-digit year in '{}' is ambiguous; use DD/MM/YYYY",
            raw.trim()
        ))),
        Some(year) if year.len() == 4 => {
            let year = i32::try_from(number(year)?).map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, day)
                .map(DayRef::Date)
                .ok_or_else(invalid)
        }
        Some(_) => Err(invalid()),
    }
}

fn resolve_day(
    day: DayRef,
    today: NaiveDate,
    clock: NaiveTime,
    clock_now: NaiveTime,
) -> ReminderResult<NaiveDate> {
    let out_of_range = || ReminderError::TimeParse(format!("date after {today} is out of range"));

    match day {
        DayRef::Today => Ok(today),
        DayRef::Tomorrow => today.checked_add_days(Days::new(1)).ok_or_else(out_of_range),
        DayRef::InDays(n) => today.checked_add_days(Days::new(n)).ok_or_else(out_of_range),
        DayRef::Weekday { day, skip_today } => {
            let target = 7 + day.num_days_from_monday();
            let mut ahead = (target - today.weekday().num_days_from_monday()) % 7;
            if ahead == 0 && (skip_today || clock <= clock_now) {
                ahead = 7;
            }
            today
                .checked_add_days(Days::new(u64::from(ahead)))
                .ok_or_else(out_of_range)
        }
        DayRef::Date(date) => Ok(date),
        DayRef::DayMonth { day, month } => {
            NaiveDate::from_ymd_opt(today.year(), month, day).ok_or_else(|| {
                ReminderError::TimeParse(format!(
                    "{day:02}/{month:02} does not exist in {}",
                    today.year()
                ))
            })
        }
    }
}

/// Resolve an expression to the UTC instant it names for this user
///
/// Missing clock times take `default_time`. A time of day that has already
/// passed rolls over to tomorrow unless the user pinned a calendar date, in
/// which case it fails with [`ReminderError::PastTime`].
pub fn resolve(
    expr: &TimeExpression,
    ctx: &UserContext,
    default_time: NaiveTime,
) -> ReminderResult<DateTime<Utc>> {
    let tz = &ctx.timezone;
    let local_now = to_local(&ctx.now, tz);
    let today = local_now.date();
    let clock = expr.clock.unwrap_or(default_time);

    let date = match expr.day {
        Some(day) => resolve_day(day, today, clock, local_now.time())?,
        None => today,
    };

    let due = localize(tz, date.and_time(clock))?;
    if due > ctx.now {
        return Ok(due);
    }

    if !expr.day.is_some_and(|day| day.is_explicit()) {
        let tomorrow = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ReminderError::TimeParse(format!("date after {date} is out of range")))?;
        let due = localize(tz, tomorrow.and_time(clock))?;
        if due > ctx.now {
            tracing::debug!(%due, "time of day already passed, rolled to tomorrow");
            return Ok(due);
        }
    }

    Err(ReminderError::PastTime(format!(
        "{} {} has already passed",
        date.format("%d/%m/%Y"),
        clock.format("%H:%M")
    )))
}
