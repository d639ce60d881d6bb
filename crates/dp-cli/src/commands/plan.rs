//! Plan command: schedule the day, check it, write the calendar.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dp_core::{GapReport, Inconsistency, Schedule, Scheduler, Task, Timeline};
use dp_io::IcsWriter;
use serde::Serialize;

use super::util::format_minutes;
use crate::Config;
use crate::oracle::build_oracle;

/// Runs the plan command.
///
/// The report is always printed. The calendar is written only when the
/// schedule passes validation and `dry_run` is off.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    date: NaiveDate,
    json: bool,
    dry_run: bool,
) -> Result<()> {
    let events = dp_io::read_events(&config.calendar_path, date).with_context(|| {
        format!(
            "failed to read calendar {}",
            config.calendar_path.display()
        )
    })?;
    let pool = dp_io::read_tasks(&config.tasks_path)
        .with_context(|| format!("failed to read tasks {}", config.tasks_path.display()))?;
    let mut oracle = build_oracle(config)?;

    let scheduler = Scheduler::new(config.schedule_config());
    let schedule = scheduler
        .schedule(&events, pool, oracle.as_mut())
        .context("failed to schedule the day")?;
    let check = scheduler.validate(&schedule, &events);
    let output = (check.is_ok() && !dry_run).then_some(config.output_path.as_path());

    if json {
        let report = format_plan_json(date, &schedule, check.as_ref().err(), output)?;
        writeln!(writer, "{report}")?;
    } else {
        write!(writer, "{}", format_plan(date, &schedule))?;
    }

    check.context("schedule failed validation; no calendar written")?;

    if let Some(path) = output {
        IcsWriter::new(date)
            .with_timezone(config.timezone.clone())
            .write(&schedule.timeline, path)
            .context("failed to write calendar")?;
        if !json {
            writeln!(writer)?;
            writeln!(writer, "Calendar written to {}", path.display())?;
        }
    }

    Ok(())
}

/// Formats the human-readable plan.
pub fn format_plan(date: NaiveDate, schedule: &Schedule) -> String {
    let mut output = String::new();

    writeln!(output, "PLAN: {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if schedule.timeline.is_empty() {
        writeln!(output, "Nothing scheduled.").unwrap();
    }
    for item in &schedule.timeline {
        let location = item
            .location
            .as_deref()
            .map(|location| format!(" @ {location}"))
            .unwrap_or_default();
        writeln!(
            output,
            "  {}-{}  {:<5}  {}{location}",
            item.start, item.end, item.kind, item.description
        )
        .unwrap();
    }

    let events = schedule.timeline.events().count();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Scheduled {} of tasks around {events} event{}.",
        format_minutes(schedule.timeline.task_minutes()),
        if events == 1 { "" } else { "s" }
    )
    .unwrap();

    if !schedule.unscheduled.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "UNSCHEDULED").unwrap();
        writeln!(output, "───────────").unwrap();
        for task in &schedule.unscheduled {
            writeln!(output, "  {}", describe_leftover(task)).unwrap();
        }
    }

    let underfilled: Vec<&GapReport> = schedule
        .gaps
        .iter()
        .filter(|gap| gap.is_underfilled())
        .collect();
    if !underfilled.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "FREE TIME").unwrap();
        writeln!(output, "─────────").unwrap();
        for gap in underfilled {
            writeln!(
                output,
                "  {}-{}  {} of {} filled",
                gap.start,
                gap.end,
                format_minutes(gap.filled),
                format_minutes(gap.size())
            )
            .unwrap();
        }
    }

    output
}

fn describe_leftover(task: &Task) -> String {
    match task.duration() {
        Some(minutes) => format!("{} ({})", task.description(), format_minutes(minutes)),
        None => format!("{} (duration unknown)", task.description()),
    }
}

/// JSON plan structure.
#[derive(Debug, Serialize)]
struct JsonPlan<'a> {
    date: NaiveDate,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
    timeline: &'a Timeline,
    unscheduled: &'a [Task],
    /// Tasks left out because no duration could be found.
    unresolved: Vec<String>,
    gaps: &'a [GapReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
}

/// Formats the plan as JSON.
fn format_plan_json(
    date: NaiveDate,
    schedule: &Schedule,
    problem: Option<&Inconsistency>,
    output: Option<&Path>,
) -> Result<String> {
    let plan = JsonPlan {
        date,
        valid: problem.is_none(),
        problem: problem.map(ToString::to_string),
        timeline: &schedule.timeline,
        unscheduled: &schedule.unscheduled,
        unresolved: schedule.unresolved().map(Task::description).collect(),
        gaps: &schedule.gaps,
        output,
    };
    Ok(serde_json::to_string_pretty(&plan)?)
}
