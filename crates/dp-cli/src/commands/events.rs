//! Events command: show what the calendar holds for the day.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dp_core::EventSet;

use super::util::format_minutes;
use crate::Config;

/// Runs the events command.
pub fn run<W: Write>(writer: &mut W, config: &Config, date: NaiveDate, json: bool) -> Result<()> {
    let events = dp_io::read_events(&config.calendar_path, date).with_context(|| {
        format!(
            "failed to read calendar {}",
            config.calendar_path.display()
        )
    })?;
    tracing::debug!(count = events.len(), %date, "read calendar events");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(events.as_slice())?)?;
    } else {
        write!(writer, "{}", format_events(date, &events))?;
    }
    Ok(())
}

/// Formats the events as a human-readable list.
pub fn format_events(date: NaiveDate, events: &EventSet) -> String {
    let mut output = String::new();

    writeln!(output, "EVENTS: {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if events.is_empty() {
        writeln!(output, "No events.").unwrap();
        return output;
    }

    for event in events {
        write!(
            output,
            "  {}-{}  {:>7}  {}",
            event.start(),
            event.end(),
            format_minutes(event.duration()),
            event.description()
        )
        .unwrap();
        if let Some(location) = event.location() {
            write!(output, " @ {location}").unwrap();
        }
        writeln!(output).unwrap();
    }

    output
}
