use thiserror::Error;

use crate::time::TimeError;
use crate::validation::Inconsistency;

/// Why a day could not be planned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Time(#[from] TimeError),

    #[error("schedule is inconsistent: {0}")]
    Inconsistent(#[from] Inconsistency),
}
