//! Plain-text task lists.
//!
//! One task per line:
//!
//! ```text
//! description [(due date)] [[duration]] [[priority]]
//! Write report (2024-05-02) [90] [1]
//! Book flights [30]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A due date, duration
//! or priority that does not parse is dropped and the task kept.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use dp_core::{Minutes, Task, TaskPool};
use regex::Regex;

use crate::error::SourceError;

static TASK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<description>.*?)\s*(?:\((?P<due>[^()]*)\)\s*)?(?:\[(?P<duration>[^\[\]]*)\]\s*)?(?:\[(?P<priority>[^\[\]]*)\]\s*)?$",
    )
    .unwrap()
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d %Y"];

/// Reads the task list at `path`.
pub fn read_tasks(path: &Path) -> Result<TaskPool, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|err| SourceError::read(path, err))?;
    let pool = parse_tasks(&text);
    tracing::debug!(path = %path.display(), count = pool.len(), "loaded tasks");
    Ok(pool)
}

/// Parses a whole task list, in file order.
pub fn parse_tasks(text: &str) -> TaskPool {
    text.lines().filter_map(parse_task_line).collect()
}

/// Parses one line; `None` for blank lines, comments and lines without a
/// description.
pub fn parse_task_line(line: &str) -> Option<Task> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let caps = TASK_LINE_RE.captures(line)?;
    let description = caps.name("description")?.as_str().trim();
    if description.is_empty() {
        return None;
    }

    let mut task = Task::new(description);
    if let Some(due) = caps.name("due") {
        match parse_due_date(due.as_str()) {
            Some(date) => task = task.with_due_date(date),
            None => tracing::debug!(task = description, value = due.as_str(), "ignoring due date"),
        }
    }
    if let Some(duration) = caps.name("duration") {
        match parse_minutes(duration.as_str()) {
            Some(minutes) => task = task.with_duration(minutes),
            None => tracing::debug!(
                task = description,
                value = duration.as_str(),
                "ignoring duration"
            ),
        }
    }
    if let Some(priority) = caps.name("priority") {
        match priority.as_str().trim().parse() {
            Ok(priority) => task = task.with_priority(priority),
            Err(_) => tracing::debug!(
                task = description,
                value = priority.as_str(),
                "ignoring priority"
            ),
        }
    }
    Some(task)
}

fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Whole minutes, optionally suffixed with `m` or `min`.
fn parse_minutes(value: &str) -> Option<Minutes> {
    let value = value.trim();
    let digits = value
        .strip_suffix("min")
        .or_else(|| value.strip_suffix('m'))
        .unwrap_or(value)
        .trim_end();
    digits.parse().ok().map(Minutes::new)
}
