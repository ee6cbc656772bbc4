//! Nudge command line entry point
//!
//! Parses a reminder submission from the command line or stdin and prints
//! the resolved reminders.

use std::fmt::Write as _;
use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use nudge_core::{ReminderParser, ReminderSpec, UserContext, format, parse_timezone, upcoming};
use nudge_shared::bootstrap;

/// Nudge: turn reminder text into scheduled reminders
#[derive(Parser, Debug)]
#[command(name = "nudge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Reminder text (read from stdin when omitted)
    text: Option<String>,

    /// IANA timezone of the user (defaults to DEFAULT_TIMEZONE or UTC)
    #[arg(short, long)]
    timezone: Option<String>,

    /// Current instant as RFC 3339 (defaults to the system clock)
    #[arg(long)]
    now: Option<String>,

    /// Maximum reminders accepted from one submission
    #[arg(short, long)]
    max: Option<usize>,

    /// Show this many upcoming occurrences of recurring reminders
    #[arg(short, long, default_value = "0")]
    upcoming: usize,

    /// Print pending reminder records as JSON, owned by this user id
    #[arg(long)]
    owner: Option<i64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Echo reminders back in the structured block format
    #[arg(long)]
    structured: bool,
}

fn main() -> Result<()> {
    bootstrap::init_env();
    let _guard = bootstrap::init_tracing("cli");

    let args = Args::parse();
    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read reminder text from stdin")?;
            text
        }
    };

    let output = run(&args, &text)?;
    println!("{output}");

    Ok(())
}

fn run(args: &Args, text: &str) -> Result<String> {
    let parser = ReminderParser::new(bootstrap::init_parser_config()?);

    let timezone = match &args.timezone {
        Some(name) => parse_timezone(name).with_context(|| format!("Invalid --timezone '{name}'"))?,
        None => parser.config().default_timezone,
    };
    let now = match &args.now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now '{raw}'"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let mut ctx = UserContext::new(timezone, now);
    if let Some(max) = args.max {
        if max == 0 {
            bail!("--max must be at least 1");
        }
        ctx = ctx.with_max_reminders(max);
    }

    let specs = parser.parse(text, &ctx)?;
    tracing::debug!(count = specs.len(), "rendering reminders");

    if let Some(owner) = args.owner {
        let records: Vec<_> = specs.into_iter().map(|spec| spec.into_pending(owner)).collect();
        return serde_json::to_string_pretty(&records).context("Failed to serialize reminders");
    }
    if args.json {
        return serde_json::to_string_pretty(&specs).context("Failed to serialize reminders");
    }

    let rendered = specs
        .iter()
        .map(|spec| render(spec, &timezone, args))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join("\n\n"))
}

fn render(spec: &ReminderSpec, tz: &Tz, args: &Args) -> Result<String> {
    let mut text = if args.structured {
        format::to_structured(spec, tz)
    } else {
        format::confirmation(spec, tz)
    };

    if let Some(rule) = spec.recurrence.filter(|_| args.upcoming > 0) {
        for due in upcoming(&rule, spec.due_at, tz, args.upcoming)? {
            let local = due.with_timezone(tz);
            write!(text, "\n  • {}", local.format("%d %b %Y %I:%M %p"))?;
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let base = ["nudge", "--timezone", "Europe/Madrid", "--now", "2024-02-24T09:00:00Z"];
        Args::parse_from(base.iter().chain(extra).copied())
    }

    #[test]
    fn test_confirmation_output() {
        let output = run(&args(&[]), "remind me tomorrow at 3pm to call mom").unwrap();
        assert_eq!(output, "🟡 Reminder set for 25 Feb 2024 at 03:00 PM:\ncall mom");
    }

    #[test]
    fn test_upcoming_occurrences() {
        let text = "daily reminder at 9am to take medicine";
        let output = run(&args(&["--upcoming", "2"]), text).unwrap();
        assert!(output.contains("🔄 Repeats every day"));
        assert!(output.contains("\n  • 26 Feb 2024 09:00 AM"));
        assert!(output.contains("\n  • 27 Feb 2024 09:00 AM"));
    }

    #[test]
    fn test_json_output() {
        let text = "reminder\npriority: high\ntime: 2pm\nStand-up";
        let output = run(&args(&["--json"]), text).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["message"], "Stand-up");
        assert_eq!(value[0]["priority"], "high");
        assert_eq!(value[0]["due_at"], "2024-02-24T13:00:00Z");
    }

    #[test]
    fn test_owner_output_is_pending() {
        let output = run(&args(&["--owner", "42"]), "stretch tomorrow").unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["owner_id"], 42);
        assert_eq!(value[0]["status"], "pending");
    }

    #[test]
    fn test_rejects_bad_timezone() {
        let args = Args::parse_from(["nudge", "--timezone", "Mars/Olympus"]);
        let err = run(&args, "call mom tomorrow").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_rejects_zero_max() {
        let err = run(&args(&["--max", "0"]), "call mom tomorrow").unwrap_err();
        assert!(err.to_string().contains("--max"));
    }
}
