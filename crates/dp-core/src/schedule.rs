//! Day scheduling: events in place, tasks in the gaps between them.

use serde::{Deserialize, Serialize};

use crate::allocation::allocate;
use crate::error::ScheduleError;
use crate::event::EventSet;
use crate::oracle::DurationOracle;
use crate::task::{Task, TaskPool};
use crate::time::{Minutes, TimeError, TimeOfDay};
use crate::timeline::{Timeline, TimelineItem};
use crate::validation::{Inconsistency, ValidationLimits, Validator};

/// Configuration for a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Earliest time a task may start.
    /// Default: 09:00.
    pub day_start: TimeOfDay,

    /// Latest time a task may end.
    /// Default: 17:00.
    pub day_end: TimeOfDay,

    /// Tolerances for the final consistency check.
    #[serde(default)]
    pub limits: ValidationLimits,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start: TimeOfDay::from_minutes(9 * 60),
            day_end: TimeOfDay::from_minutes(17 * 60),
            limits: ValidationLimits::default(),
        }
    }
}

/// How much of one free interval received tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapReport {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub filled: Minutes,
}

impl GapReport {
    pub fn size(&self) -> Minutes {
        self.end.minutes_since(self.start).unwrap_or(Minutes::ZERO)
    }

    pub fn is_underfilled(&self) -> bool {
        self.filled < self.size()
    }
}

/// Outcome of a planning run.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub timeline: Timeline,

    /// Tasks (or split remainders) that did not fit into the day.
    pub unscheduled: Vec<Task>,

    /// One entry per gap the allocator was asked to fill, in time order.
    pub gaps: Vec<GapReport>,
}

impl Schedule {
    /// Unscheduled tasks whose duration could never be resolved.
    pub fn unresolved(&self) -> impl Iterator<Item = &Task> {
        self.unscheduled
            .iter()
            .filter(|task| task.duration().is_none())
    }

    /// Known minutes of work left over.
    pub fn unscheduled_minutes(&self) -> Minutes {
        self.unscheduled
            .iter()
            .filter_map(Task::duration)
            .fold(Minutes::ZERO, |total, minutes| total + minutes)
    }
}

/// Lays out one day.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    config: ScheduleConfig,
}

impl Scheduler {
    pub const fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Builds the timeline for the day.
    ///
    /// Events are appended in start order, including those outside the day
    /// window; tasks only ever fill `[day_start, day_end)`. The pool is
    /// prioritized once up front. Fails only if `day_end` lies before
    /// `day_start`.
    pub fn schedule(
        &self,
        events: &EventSet,
        mut pool: TaskPool,
        oracle: &mut dyn DurationOracle,
    ) -> Result<Schedule, TimeError> {
        let ScheduleConfig {
            day_start,
            day_end,
            ..
        } = self.config;
        day_end.minutes_since(day_start)?;

        pool.prioritize();
        tracing::debug!(
            events = events.len(),
            tasks = pool.len(),
            %day_start,
            %day_end,
            "scheduling day"
        );

        let mut timeline = Timeline::new();
        let mut gaps = Vec::new();
        let mut current = day_start;

        for event in events {
            let gap_end = event.start().min(day_end);
            if current < gap_end {
                pool = fill_gap(pool, current, gap_end, oracle, &mut timeline, &mut gaps)?;
            }
            timeline.push(TimelineItem::from_event(event));
            current = current.max(event.end());
        }
        if current < day_end {
            pool = fill_gap(pool, current, day_end, oracle, &mut timeline, &mut gaps)?;
        }

        let unscheduled = pool.into_vec();
        if !unscheduled.is_empty() {
            tracing::info!(count = unscheduled.len(), "tasks left unscheduled");
        }

        Ok(Schedule {
            timeline,
            unscheduled,
            gaps,
        })
    }

    /// The validator for this day: configured limits, bounded by the window.
    pub const fn validator(&self) -> Validator {
        Validator::new(self.config.limits).with_window(self.config.day_start, self.config.day_end)
    }

    /// Checks a schedule built by this scheduler from `events`.
    pub fn validate(&self, schedule: &Schedule, events: &EventSet) -> Result<(), Inconsistency> {
        self.validator().validate(&schedule.timeline, events)
    }

    /// Schedules the day and checks the result.
    pub fn plan(
        &self,
        events: &EventSet,
        pool: TaskPool,
        oracle: &mut dyn DurationOracle,
    ) -> Result<Schedule, ScheduleError> {
        let schedule = self.schedule(events, pool, oracle)?;
        self.validate(&schedule, events)?;
        Ok(schedule)
    }
}

fn fill_gap(
    pool: TaskPool,
    start: TimeOfDay,
    end: TimeOfDay,
    oracle: &mut dyn DurationOracle,
    timeline: &mut Timeline,
    gaps: &mut Vec<GapReport>,
) -> Result<TaskPool, TimeError> {
    let available = end.minutes_since(start)?;
    let allocation = allocate(pool, available, start, oracle);

    let report = GapReport {
        start,
        end,
        filled: allocation.filled,
    };
    if report.is_underfilled() {
        tracing::warn!(
            %start,
            %end,
            filled = report.filled.get(),
            unresolved = allocation.unresolved.len(),
            "gap left partly empty"
        );
    }

    timeline.extend(allocation.items);
    gaps.push(report);
    Ok(allocation.pool)
}
