//! Timezone handling utilities
//!
//! Provides functions for parsing timezones and converting between a user's
//! wall clock and UTC without ever guessing across a DST transition.

use chrono::{DateTime, MappedLocalTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ReminderError, ReminderResult};

/// Parse an IANA timezone string (e.g., "Asia/Singapore", "Europe/London")
///
/// # Examples
///
/// ```
/// use nudge_core::timezone::parse_timezone;
///
/// let tz = parse_timezone("America/New_York").unwrap();
/// assert_eq!(tz.name(), "America/New_York");
/// ```
pub fn parse_timezone(tz_str: &str) -> ReminderResult<Tz> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| ReminderError::InvalidTimezone(tz_str.to_string()))
}

/// Validate that a timezone string is valid
///
/// Returns `Ok(())` if valid, `Err` otherwise
pub fn validate_timezone(tz_str: &str) -> ReminderResult<()> {
    parse_timezone(tz_str)?;
    Ok(())
}

/// Convert UTC time to a user's wall clock
pub fn to_local(utc_time: &DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    utc_time.with_timezone(tz).naive_local()
}

/// Convert a wall-clock timestamp in `tz` to UTC
///
/// The offset is taken at `local` itself, not at the current instant, so
/// reminders on the far side of a DST change keep their wall-clock time.
/// A timestamp skipped by a spring-forward gap fails with
/// [`ReminderError::AmbiguousTime`]; a timestamp repeated by a fall-back
/// overlap resolves to its earlier occurrence.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use nudge_core::timezone::{localize, parse_timezone};
///
/// let tz = parse_timezone("Asia/Singapore").unwrap();
/// let local = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let utc = localize(&tz, local).unwrap();
/// assert_eq!(utc.to_rfc3339(), "2026-01-18T04:00:00+00:00");
/// ```
pub fn localize(tz: &Tz, local: NaiveDateTime) -> ReminderResult<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        MappedLocalTime::Single(time) => Ok(time.with_timezone(&Utc)),
        MappedLocalTime::Ambiguous(earliest, _) => {
            tracing::debug!(
                %local,
                timezone = tz.name(),
                "local time repeats, using earlier instant"
            );
            Ok(earliest.with_timezone(&Utc))
        }
        MappedLocalTime::None => Err(ReminderError::AmbiguousTime(format!(
            "{} does not exist in {} (clocks skip it for daylight saving)",
            local.format("%d/%m/%Y %H:%M"),
            tz.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timezone_valid() {
        let tz = parse_timezone("Europe/Madrid");
        assert!(tz.is_ok());
        assert_eq!(tz.unwrap().name(), "Europe/Madrid");
    }

    #[test]
    fn test_parse_timezone_invalid() {
        match parse_timezone("Invalid/Timezone") {
            Err(ReminderError::InvalidTimezone(s)) => assert_eq!(s, "Invalid/Timezone"),
            other => panic!("Expected InvalidTimezone error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("Europe/London").is_ok());
        assert!(validate_timezone("America/Los_Angeles").is_ok());
        assert!(validate_timezone("Invalid/Zone").is_err());
    }

    #[test]
    fn test_utc_to_singapore_wall_clock() {
        let tz = parse_timezone("Asia/Singapore").unwrap();
        let utc = Utc.with_ymd_and_hms(2026, 1, 18, 4, 0, 0).unwrap();
        let local = to_local(&utc, &tz);
        assert_eq!(local.hour(), 12);
        assert_eq!(local.minute(), 0);
    }

    #[test]
    fn test_localize_uses_offset_at_target_time() {
        let tz = parse_timezone("Europe/Madrid").unwrap();

        // Winter: UTC+1
        let winter = localize(&tz, naive(2024, 2, 25, 15, 0)).unwrap();
        assert_eq!(winter, Utc.with_ymd_and_hms(2024, 2, 25, 14, 0, 0).unwrap());

        // Summer: UTC+2
        let summer = localize(&tz, naive(2024, 4, 2, 15, 0)).unwrap();
        assert_eq!(summer, Utc.with_ymd_and_hms(2024, 4, 2, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_localize_spring_forward_gap_fails() {
        // 2024-03-31 02:30 does not exist in Madrid
        let tz = parse_timezone("Europe/Madrid").unwrap();
        let result = localize(&tz, naive(2024, 3, 31, 2, 30));
        assert!(matches!(result, Err(ReminderError::AmbiguousTime(_))));
    }

    #[test]
    fn test_localize_fall_back_overlap_takes_earlier() {
        // 2024-10-27 02:30 happens twice in Madrid; first at UTC+2
        let tz = parse_timezone("Europe/Madrid").unwrap();
        let utc = localize(&tz, naive(2024, 10, 27, 2, 30)).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }
}
