//! Gap allocation algorithm.
//!
//! Fills one free interval of the day with tasks drawn from the pool.
//!
//! # Algorithm Summary
//!
//! 1. Walk the pool in its scheduling order with a cursor at the gap start
//! 2. Ask the duration oracle about tasks without a duration; skip the ones
//!    it cannot answer for (they stay in the pool)
//! 3. Place every task that fits whole and drop it from the pool
//! 4. Split the first task that does not fit: its head fills the rest of the
//!    gap, its remainder takes its place in the pool, and the gap is closed

use crate::oracle::{DurationOracle, usable_minutes};
use crate::task::TaskPool;
use crate::time::{Minutes, TimeOfDay};
use crate::timeline::TimelineItem;

/// Result of filling one gap.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Items placed in the gap, in time order.
    pub items: Vec<TimelineItem>,

    /// The pool left over for later gaps.
    pub pool: TaskPool,

    /// Minutes of the gap that received a task.
    pub filled: Minutes,

    /// Descriptions of tasks skipped because no duration could be resolved.
    pub unresolved: Vec<String>,
}

/// Fills the gap of `available` minutes starting at `start`.
///
/// The pool is consumed and the remainder returned in
/// [`Allocation::pool`], in the same relative order. A gap of zero minutes
/// returns the pool untouched without consulting the oracle.
///
/// The gap may be left partly empty when the pool runs out of tasks with a
/// known or resolvable duration; `filled` tells callers how much was used.
pub fn allocate(
    pool: TaskPool,
    available: Minutes,
    start: TimeOfDay,
    oracle: &mut dyn DurationOracle,
) -> Allocation {
    let (tasks, next_id) = pool.into_parts();
    let mut remaining = available;
    let mut cursor = start;
    let mut items = Vec::new();
    let mut unresolved = Vec::new();
    let mut kept = Vec::with_capacity(tasks.len());

    let mut pending = tasks.into_iter();
    while let Some(mut task) = pending.next() {
        if remaining.is_zero() {
            kept.push(task);
            break;
        }

        let duration = if let Some(known) = task.duration() {
            known
        } else {
            let description = task.description();
            if let Some(estimate) = usable_minutes(oracle.resolve(&description)) {
                tracing::debug!(
                    task = %description,
                    minutes = estimate.get(),
                    "resolved task duration"
                );
                task.set_duration(estimate);
                estimate
            } else {
                tracing::debug!(
                    task = %description,
                    "no duration for task, skipping for this gap"
                );
                unresolved.push(description);
                kept.push(task);
                continue;
            }
        };

        if duration <= remaining {
            items.push(TimelineItem::task(task.description(), cursor, duration));
            cursor += duration;
            remaining = remaining.saturating_sub(duration);
            continue;
        }

        // The task straddles the end of the gap. Its head closes the gap and
        // the cursor stays where the head was placed.
        let (head, rest) = match task.split(remaining) {
            Ok(parts) => parts,
            Err(task) => {
                kept.push(task);
                continue;
            }
        };
        tracing::debug!(
            task = %head.description(),
            placed = remaining.get(),
            left = rest.duration().map_or(0, Minutes::get),
            "split task at gap boundary"
        );
        items.push(TimelineItem::task(head.description(), cursor, remaining));
        kept.push(rest);
        remaining = Minutes::ZERO;
    }
    kept.extend(pending);

    Allocation {
        items,
        pool: TaskPool::from_parts(kept, next_id),
        filled: available.saturating_sub(remaining),
        unresolved,
    }
}
