//! Duration estimates for tasks that arrive without one.

use crate::time::Minutes;

/// Estimates how long a task will take, given its description.
///
/// Implementations may block or fail. A `None` answer, or a non-positive
/// number, means "unknown": the allocator skips the task for the current gap
/// and leaves it in the pool.
pub trait DurationOracle {
    fn resolve(&mut self, description: &str) -> Option<i64>;
}

impl<F> DurationOracle for F
where
    F: FnMut(&str) -> Option<i64>,
{
    fn resolve(&mut self, description: &str) -> Option<i64> {
        self(description)
    }
}

/// Never knows a duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEstimates;

impl DurationOracle for NoEstimates {
    fn resolve(&mut self, _description: &str) -> Option<i64> {
        None
    }
}

/// Gives every task the same duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedEstimate(pub Minutes);

impl DurationOracle for FixedEstimate {
    fn resolve(&mut self, _description: &str) -> Option<i64> {
        Some(i64::from(self.0.get()))
    }
}

/// Converts a raw oracle answer into a usable duration.
pub(crate) fn usable_minutes(answer: Option<i64>) -> Option<Minutes> {
    answer
        .filter(|minutes| *minutes > 0)
        .and_then(|minutes| u32::try_from(minutes).ok())
        .map(Minutes::new)
}
