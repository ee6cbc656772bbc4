//! Block splitting
//!
//! A submission whose first line is the `reminder` keyword and which carries
//! labeled lines is structured. It may hold several reminders: every
//! blank-line-separated group with its own `time:` or `date:` label starts a
//! new block, and labeled lines ahead of the first time/date label are
//! shared defaults for all blocks. Anything else is free-form and yields
//! exactly one block.

use crate::fields::{is_label, is_time_anchor};

/// How a submission expresses its reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `label: value` lines
    Structured,
    /// Natural sentence phrasing
    FreeForm,
}

/// A submission split into independent blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub mode: Mode,
    /// Labeled lines shared by every block
    pub header: String,
    pub blocks: Vec<String>,
}

impl Submission {
    fn free_form(text: &str) -> Self {
        Self {
            mode: Mode::FreeForm,
            header: String::new(),
            blocks: vec![text.trim().to_string()],
        }
    }
}

fn is_marker(line: &str) -> bool {
    let word = line.trim().trim_end_matches(':').trim_end();
    word.eq_ignore_ascii_case("reminder") || word.eq_ignore_ascii_case("reminders")
}

/// Split raw submission text into blocks
pub fn split(text: &str) -> Submission {
    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());

    let Some(first) = lines.next() else {
        return Submission::free_form(text);
    };
    if !is_marker(first) {
        return Submission::free_form(text);
    }

    let body: Vec<&str> = lines.collect();
    if !body.iter().any(|line| is_label(line)) {
        // "reminder" followed by a plain sentence
        return Submission::free_form(&body.join("\n"));
    }

    split_structured(&body)
}

fn split_structured(body: &[&str]) -> Submission {
    let groups: Vec<Vec<&str>> = body
        .split(|line| line.trim().is_empty())
        .filter(|group| !group.is_empty())
        .map(<[&str]>::to_vec)
        .collect();

    let mut header: Vec<&str> = Vec::new();
    let mut preamble: Vec<&str> = Vec::new();
    let mut blocks: Vec<Vec<&str>> = Vec::new();

    for group in groups {
        if group.iter().any(|line| is_time_anchor(line)) {
            blocks.push(group);
        } else if let Some(last) = blocks.last_mut() {
            last.extend(group);
        } else {
            for line in group {
                if is_label(line) {
                    header.push(line);
                } else {
                    preamble.push(line);
                }
            }
        }
    }

    if blocks.is_empty() {
        // No time/date labels anywhere: the whole body is one reminder
        return Submission {
            mode: Mode::Structured,
            header: String::new(),
            blocks: vec![body.join("\n")],
        };
    }

    // Labels leading the first block, before its time/date, are shared
    let first = &mut blocks[0];
    let shared = first
        .iter()
        .take_while(|line| is_label(line) && !is_time_anchor(line))
        .count();
    header.extend(first.drain(..shared));

    // Unlabeled preamble text belongs to the first reminder
    if !preamble.is_empty() {
        preamble.append(first);
        *first = preamble;
    }

    Submission {
        mode: Mode::Structured,
        header: header.join("\n"),
        blocks: blocks.into_iter().map(|block| block.join("\n")).collect(),
    }
}
