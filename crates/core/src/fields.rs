//! Field extraction
//!
//! Separates a block's metadata (priority, time, date, repeat) from the body
//! text that becomes the reminder message.
//!
//! Structured blocks carry `key: value` lines. Free-form blocks embed the
//! same information in the sentence ("urgent reminder at 9am to call mom"),
//! so trigger phrases are located by pattern, in a fixed order, and cut out
//! of the text. What remains, minus leading connector words such as
//! "remind me to", is the message.

use regex::Regex;
use std::sync::LazyLock;

use crate::blocks::Mode;
use crate::error::{ReminderError, ReminderResult};
use crate::models::Priority;
use crate::priority::MARKERS;

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const WEEKDAY_ABBREVIATIONS: &str = "mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun";

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(priority|time|date|repeat)\s*:\s*(.*?)\s*$").expect("valid regex")
});

static EVERY_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bevery\s+({WEEKDAYS}|{WEEKDAY_ABBREVIATIONS})\b"))
        .expect("valid regex")
});

static RECURRENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(every\s+\d+\s+(?:day|week|month)s?|every\s+(?:day|week|month)|daily|weekly|monthly)\b",
    )
    .expect("valid regex")
});

/// End of a day word: not followed by more of the word or a possessive `'s`
///
/// The regex crate has no look-ahead, so this consumes the following
/// character; `cut` puts a space back in its place.
const WORD_END: &str = r"(?:$|[^\w'’])";

/// End of a bare number: not followed by more digits or a separator that
/// would make it part of a longer clock time or date
const NUMBER_END: &str = r"(?:$|[.,;!?)]?(?:\s|$))";

/// Full calendar dates, taken before clock phrases so `01.03.2024` is not
/// read as the clock time `01.03`
static EXPLICIT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:on|at)\s+)?\b(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}|\d{1,2}/\d{1,2})\b",
    )
    .expect("valid regex")
});

/// Clock phrases that are unambiguous on their own
static CLOCK: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:at\s+)?(\d{1,2}(?:[:.]\d{2})?\s*(?:am|pm))\b",
        r"(?i)\b(?:at\s+)?(\d{1,2}:\d{2})\b",
        // "18.30" only after "at", so amounts like "3.50" stay in the message
        r"(?i)\bat\s+(\d{1,2}\.\d{2})\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Relative day phrases in precedence order; the first that matches wins
static DAY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)(?:\bon\s+)?\b(today|tonight|tomorrow|tmrw|tmr|next\s+week){WORD_END}"),
        format!(r"(?i)(?:\bon\s+)?\b((?:next\s+|this\s+)?(?:{WEEKDAYS})){WORD_END}"),
        format!(r"(?i)\b((?:on|next|this)\s+(?:{WEEKDAY_ABBREVIATIONS})){WORD_END}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static NAMED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:in\s+the|this|at|in)\s+)?(morning|afternoon|evening|night|noon|midday|midnight)\b",
    )
    .expect("valid regex")
});

/// A bare hour after "at" ("at 17"), tried once dates are out of the way
static BARE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bat\s+(\d{{1,2}}){NUMBER_END}")).expect("valid regex")
});

static REMIND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:please\s+)?(?:remind\s+me|reminders?|remind)\b[\s:,-]*")
        .expect("valid regex")
});

static LEADING_CONNECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:to|about|for|that)\b[\s:,-]*").expect("valid regex"));

/// Raw, unvalidated field values found in one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    /// Explicit `priority:` value
    pub priority: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub repeat: Option<String>,
    /// Priority marker phrases found in free-form text
    pub priority_markers: Vec<Priority>,
}

impl RawFields {
    /// Fill unset fields from shared submission defaults
    pub fn with_defaults(mut self, defaults: &Self) -> Self {
        self.priority = self.priority.or_else(|| defaults.priority.clone());
        self.time = self.time.or_else(|| defaults.time.clone());
        self.date = self.date.or_else(|| defaults.date.clone());
        self.repeat = self.repeat.or_else(|| defaults.repeat.clone());
        self
    }

    fn set_label(&mut self, key: &str, value: &str) {
        let value = (!value.is_empty()).then(|| value.to_string());
        match key.to_lowercase().as_str() {
            "priority" => self.priority = value,
            "time" => self.time = value,
            "date" => self.date = value,
            "repeat" => self.repeat = value,
            _ => {}
        }
    }
}

/// Whether `line` is a `key: value` line for a known field
pub fn is_label(line: &str) -> bool {
    LABEL.is_match(line)
}

/// Whether `line` labels a time or date, which starts a new reminder
pub fn is_time_anchor(line: &str) -> bool {
    LABEL.captures(line).is_some_and(|caps| {
        let key = caps[1].to_lowercase();
        key == "time" || key == "date"
    })
}

/// Collect labeled fields from lines, returning them with the unlabeled lines
pub fn extract_labels(text: &str) -> (RawFields, Vec<&str>) {
    let mut fields = RawFields::default();
    let mut rest = Vec::new();

    for line in text.lines() {
        if let Some(caps) = LABEL.captures(line) {
            fields.set_label(&caps[1], &caps[2]);
        } else if !line.trim().is_empty() {
            rest.push(line.trim());
        }
    }

    (fields, rest)
}

/// Split one block into its message and raw fields
pub fn extract(block: &str, mode: Mode) -> ReminderResult<(String, RawFields)> {
    let (message, fields) = match mode {
        Mode::Structured => {
            let (fields, lines) = extract_labels(block);
            (lines.join(" "), fields)
        }
        Mode::FreeForm => extract_free_form(block),
    };

    let message = message.trim().to_string();
    if message.is_empty() {
        return Err(ReminderError::EmptyMessage);
    }

    Ok((message, fields))
}

/// Cut the first match of `re` out of `text`, returning its first group
fn cut(text: &mut String, re: &Regex) -> Option<String> {
    let (range, value) = {
        let caps = re.captures(text.as_str())?;
        let whole = caps.get(0)?;
        let value = caps.get(1).unwrap_or(whole).as_str().trim().to_string();
        (whole.range(), value)
    };
    text.replace_range(range, " ");
    Some(value)
}

fn extract_free_form(block: &str) -> (String, RawFields) {
    let mut text = block.to_string();
    let mut fields = RawFields::default();

    for (re, level) in MARKERS.iter() {
        while cut(&mut text, re).is_some() {
            fields.priority_markers.push(*level);
        }
    }

    if let Some(weekday) = cut(&mut text, &EVERY_WEEKDAY) {
        fields.repeat = Some("weekly".to_string());
        fields.date = Some(weekday);
    } else {
        fields.repeat = cut(&mut text, &RECURRENCE);
    }

    if fields.date.is_none() {
        fields.date = cut(&mut text, &EXPLICIT_DATE);
    }

    fields.time = CLOCK.iter().find_map(|re| cut(&mut text, re));

    if fields.date.is_none() {
        fields.date = DAY.iter().find_map(|re| cut(&mut text, re));
    }

    if let Some(named) = cut(&mut text, &NAMED_TIME) {
        fields.time.get_or_insert(named);
    }

    if fields.time.is_none() {
        fields.time = cut(&mut text, &BARE_HOUR);
    }

    if fields.time.is_none()
        && fields
            .date
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("tonight"))
    {
        fields.time = Some("tonight".to_string());
    }

    (clean_message(&text), fields)
}

fn clean_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let message = REMIND_PREFIX.replace(&collapsed, "");
    let message = LEADING_CONNECTOR.replace(&message, "");
    message
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-'))
        .to_string()
}
