//! Input and output formats for dayplan.
//!
//! - Calendar source: the day's events from an `.ics` file
//! - Task source: a plain-text task list, one task per line
//! - Calendar writer: the planned timeline as an `.ics` file

pub mod calendar;
mod error;
pub mod ics;
pub mod tasks;

pub use calendar::{parse_events, read_events};
pub use error::SourceError;
pub use ics::IcsWriter;
pub use tasks::{parse_task_line, parse_tasks, read_tasks};
