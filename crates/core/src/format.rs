//! Rendering of resolved reminders for the chat layer

use std::fmt::Write;

use chrono_tz::Tz;

use crate::models::{Priority, ReminderSpec};

// Writing into a String cannot fail, so the fmt::Result values below are
// discarded.

/// Render a reminder back into the structured block format
///
/// The output parses back into an equivalent reminder as long as its due
/// time is still in the future.
pub fn to_structured(spec: &ReminderSpec, tz: &Tz) -> String {
    let local = spec.due_at.with_timezone(tz);
    let mut text = String::from("reminder\n");

    if spec.priority != Priority::Medium {
        let _ = writeln!(text, "priority: {}", spec.priority);
    }
    let _ = writeln!(text, "date: {}", local.format("%d/%m/%Y"));
    let _ = writeln!(
        text,
        "time: {}",
        local.format("%I:%M%p").to_string().to_lowercase()
    );
    if let Some(rule) = &spec.recurrence {
        let _ = writeln!(text, "repeat: {rule}");
    }
    text.push_str(&spec.message);

    text
}

/// Confirmation shown to the user once a reminder is stored
pub fn confirmation(spec: &ReminderSpec, tz: &Tz) -> String {
    let local = spec.due_at.with_timezone(tz);
    let mut text = format!(
        "{} Reminder set for {} at {}:\n{}",
        spec.priority.emoji(),
        local.format("%d %b %Y"),
        local.format("%I:%M %p"),
        spec.message
    );

    if let Some(rule) = &spec.recurrence {
        let _ = write!(text, "\n🔄 Repeats {rule}");
    }

    text
}
