//! Core planning logic for dayplan.
//!
//! This crate contains the fundamental types and logic for:
//! - Time model: day-local instants and minute durations
//! - Task pool: flexible work in scheduling order, split across gaps
//! - Scheduling: filling the gaps between fixed events with tasks
//! - Validation: checking a finished timeline for consistency

mod allocation;
mod error;
pub mod event;
pub mod oracle;
mod schedule;
pub mod task;
pub mod time;
pub mod timeline;
mod validation;

pub use allocation::{Allocation, allocate};
pub use error::ScheduleError;
pub use event::{Event, EventSet};
pub use oracle::{DurationOracle, FixedEstimate, NoEstimates};
pub use schedule::{GapReport, Schedule, ScheduleConfig, Scheduler};
pub use task::{Task, TaskId, TaskPool};
pub use time::{MINUTES_PER_DAY, Minutes, TimeError, TimeOfDay};
pub use timeline::{ItemKind, Timeline, TimelineItem};
pub use validation::{Inconsistency, ValidationLimits, Validator};
