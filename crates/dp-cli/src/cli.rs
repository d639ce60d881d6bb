//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dp_core::TimeOfDay;

/// Plan a working day.
///
/// Reads the day's calendar events and a task list, fills the free time
/// between events with tasks, and writes the result as an `.ics` calendar.
#[derive(Debug, Parser)]
#[command(name = "dayplan", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Per-run values that take precedence over the configuration.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Day to plan (YYYY-MM-DD); defaults to today.
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    /// Earliest time a task may start (HH:MM).
    #[arg(long, global = true)]
    pub day_start: Option<TimeOfDay>,

    /// Latest time a task may end (HH:MM).
    #[arg(long, global = true)]
    pub day_end: Option<TimeOfDay>,

    /// Calendar file to read events from.
    #[arg(long, global = true)]
    pub calendar: Option<PathBuf>,

    /// Task list to schedule.
    #[arg(long, global = true)]
    pub tasks: Option<PathBuf>,

    /// Where to write the planned calendar.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build, check and write the day's schedule.
    Plan {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Print the schedule without writing the calendar file.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the day's calendar events.
    Events {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the tasks in scheduling order.
    Tasks {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_with_overrides() {
        let cli = Cli::try_parse_from([
            "dayplan",
            "plan",
            "--dry-run",
            "--date",
            "2024-05-02",
            "--day-start",
            "08:30",
            "--tasks",
            "today.txt",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::Plan {
                json: false,
                dry_run: true
            })
        ));
        assert_eq!(cli.overrides.date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(cli.overrides.day_start, "08:30".parse().ok());
        assert_eq!(cli.overrides.tasks, Some(PathBuf::from("today.txt")));
        assert_eq!(cli.overrides.day_end, None);
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(Cli::try_parse_from(["dayplan", "plan", "--day-end", "5pm"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
