//! Tasks command: show the task list in the order it will be scheduled.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use dp_core::{Task, TaskPool};

use super::util::format_minutes;
use crate::Config;

/// Runs the tasks command.
pub fn run<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let mut pool = dp_io::read_tasks(&config.tasks_path)
        .with_context(|| format!("failed to read tasks {}", config.tasks_path.display()))?;
    pool.prioritize();

    if json {
        let tasks: Vec<&Task> = pool.iter().collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&tasks)?)?;
    } else {
        write!(writer, "{}", format_tasks(&pool))?;
    }
    Ok(())
}

/// Formats the pool as a numbered list.
pub fn format_tasks(pool: &TaskPool) -> String {
    let mut output = String::new();

    if pool.is_empty() {
        writeln!(output, "No tasks.").unwrap();
        return output;
    }

    writeln!(output, "TASKS").unwrap();
    writeln!(output, "─────").unwrap();
    for (position, task) in pool.iter().enumerate() {
        let duration = task
            .duration()
            .map_or_else(|| "?".to_string(), format_minutes);
        write!(
            output,
            "  {:>2}. {:>7}  {}",
            position + 1,
            duration,
            task.description()
        )
        .unwrap();
        if let Some(priority) = task.priority() {
            write!(output, "  [p{priority}]").unwrap();
        }
        if let Some(due) = task.due_date() {
            write!(output, "  due {due}").unwrap();
        }
        writeln!(output).unwrap();
    }

    let known = pool.known_minutes();
    let unknown = pool.iter().filter(|task| task.duration().is_none()).count();
    writeln!(output).unwrap();
    write!(output, "Total: {}", format_minutes(known)).unwrap();
    if unknown > 0 {
        write!(output, " plus {unknown} without an estimate").unwrap();
    }
    writeln!(output).unwrap();

    output
}
