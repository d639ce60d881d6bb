//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use dp_core::{Minutes, ScheduleConfig, TimeOfDay, ValidationLimits};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::Overrides;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar to read the day's events from.
    pub calendar_path: PathBuf,

    /// Task list, one task per line.
    pub tasks_path: PathBuf,

    /// Where the planned calendar is written.
    pub output_path: PathBuf,

    /// Earliest time a task may start.
    pub day_start: TimeOfDay,

    /// Latest time a task may end.
    pub day_end: TimeOfDay,

    /// IANA timezone written as `TZID` in the output; floating times if unset.
    pub timezone: Option<String>,

    /// Longest idle stretch the schedule may contain.
    pub max_gap_minutes: u32,

    /// Longest single item the schedule may contain.
    pub max_item_minutes: u32,

    /// Estimate used for tasks without a duration when the model has none.
    pub default_task_minutes: Option<u32>,

    /// Claude API key for duration estimates.
    pub api_key: Option<String>,

    /// Model used for duration estimates.
    pub model: String,

    /// Per-request limit for duration estimates.
    pub oracle_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_path", &self.calendar_path)
            .field("tasks_path", &self.tasks_path)
            .field("output_path", &self.output_path)
            .field("day_start", &self.day_start)
            .field("day_end", &self.day_end)
            .field("timezone", &self.timezone)
            .field("max_gap_minutes", &self.max_gap_minutes)
            .field("max_item_minutes", &self.max_item_minutes)
            .field("default_task_minutes", &self.default_task_minutes)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("oracle_timeout_secs", &self.oracle_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let schedule = ScheduleConfig::default();
        let limits = ValidationLimits::default();
        Self {
            calendar_path: PathBuf::from("calendar.ics"),
            tasks_path: PathBuf::from("tasks.txt"),
            output_path: PathBuf::from("generated_schedule.ics"),
            day_start: schedule.day_start,
            day_end: schedule.day_end,
            timezone: iana_time_zone::get_timezone().ok(),
            max_gap_minutes: limits.max_gap.get(),
            max_item_minutes: limits.max_item.get(),
            default_task_minutes: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            oracle_timeout_secs: 20,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // DAYPLAN_* environment variables win over files.
        figment = figment.merge(Env::prefixed("DAYPLAN_"));

        figment.extract()
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(day_start) = overrides.day_start {
            self.day_start = day_start;
        }
        if let Some(day_end) = overrides.day_end {
            self.day_end = day_end;
        }
        if let Some(path) = &overrides.calendar {
            self.calendar_path.clone_from(path);
        }
        if let Some(path) = &overrides.tasks {
            self.tasks_path.clone_from(path);
        }
        if let Some(path) = &overrides.output {
            self.output_path.clone_from(path);
        }
    }

    pub const fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_item: Minutes::new(self.max_item_minutes),
            max_gap: Minutes::new(self.max_gap_minutes),
        }
    }

    pub const fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            day_start: self.day_start,
            day_end: self.day_end,
            limits: self.limits(),
        }
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Returns the platform-specific config directory for dayplan.
///
/// On Linux: `~/.config/dayplan`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dayplan"))
}
