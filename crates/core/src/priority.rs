//! Priority classification
//!
//! Exactly one rule fires per block, highest first:
//! 1. an explicit `priority:` field (must name a level)
//! 2. a high-priority marker phrase ("urgent", "important", "high priority")
//! 3. a low-priority marker phrase ("low priority")
//! 4. medium

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ReminderResult;
use crate::fields::RawFields;
use crate::models::Priority;

/// Marker phrases recognised in free-form text, with the level each implies
pub(crate) static MARKERS: LazyLock<Vec<(Regex, Priority)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(?:urgent(?:ly)?|important|high[\s-]+priority)\b", Priority::High),
        (r"(?i)\blow[\s-]+priority\b", Priority::Low),
        (r"(?i)\b(?:medium|normal)[\s-]+priority\b", Priority::Medium),
    ]
    .into_iter()
    .map(|(pattern, level)| (Regex::new(pattern).expect("valid regex"), level))
    .collect()
});

/// Decide the priority of one block
pub fn classify(fields: &RawFields) -> ReminderResult<Priority> {
    if let Some(explicit) = fields.priority.as_deref() {
        return explicit.parse();
    }

    let markers = &fields.priority_markers;
    if markers.contains(&Priority::High) {
        Ok(Priority::High)
    } else if markers.contains(&Priority::Low) {
        Ok(Priority::Low)
    } else {
        Ok(Priority::Medium)
    }
}
