//! Consistency checks for a finished timeline.
//!
//! The validator is read-only: it reports the first broken invariant and
//! never repairs the timeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventSet;
use crate::time::{Minutes, TimeOfDay};
use crate::timeline::Timeline;

/// Tolerances applied by the [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    /// Longest allowed single item.
    /// Default: 1440 (a full day).
    pub max_item: Minutes,

    /// Longest allowed idle stretch of the day.
    /// Default: 240 (4 hours).
    pub max_gap: Minutes,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_item: Minutes::new(1440),
            max_gap: Minutes::new(240),
        }
    }
}

/// A broken timeline invariant.
///
/// Indices are positions in the timeline; `Overlap` names the first item of
/// the pair (the second is at `index + 1`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("timeline holds {found} events but {expected} were scheduled")]
    EventCount { expected: usize, found: usize },

    #[error("item {index} ({found}) does not match calendar event {expected}")]
    EventMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("items {index} ({first}) and {next} ({second}) overlap", next = .index + 1)]
    Overlap {
        index: usize,
        first: String,
        second: String,
    },

    #[error("item {index} ({description}) lasts {duration}, outside (0m, {max}]")]
    ItemDuration {
        index: usize,
        description: String,
        duration: Minutes,
        max: Minutes,
    },

    #[error("gap of {gap} from {start} to {end} exceeds {max}")]
    GapTooLarge {
        start: TimeOfDay,
        end: TimeOfDay,
        gap: Minutes,
        max: Minutes,
    },
}

/// Checks a timeline against the events it was built from.
///
/// Without a day window only the stretches between adjacent items are
/// measured. With one, the stretch from `day_start` to the first item and
/// from the last item to `day_end` count too, and an empty timeline is one
/// idle stretch covering the whole window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: ValidationLimits,
    window: Option<(TimeOfDay, TimeOfDay)>,
}

impl Validator {
    pub const fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
            window: None,
        }
    }

    /// Also checks the idle time at both ends of `[day_start, day_end)`.
    #[must_use]
    pub const fn with_window(mut self, day_start: TimeOfDay, day_end: TimeOfDay) -> Self {
        self.window = Some((day_start, day_end));
        self
    }

    pub const fn limits(&self) -> ValidationLimits {
        self.limits
    }

    /// Runs every check in order, stopping at the first failure:
    ///
    /// 1. the timeline holds as many events as `events`
    /// 2. each event item equals its calendar event (start, end, description)
    /// 3. adjacent items do not overlap
    /// 4. every item lasts more than zero and at most `max_item` minutes
    /// 5. no idle stretch lasts more than `max_gap` minutes
    pub fn validate(&self, timeline: &Timeline, events: &EventSet) -> Result<(), Inconsistency> {
        check_event_count(timeline, events)?;
        check_events_match(timeline, events)?;
        check_no_overlap(timeline)?;
        self.check_item_durations(timeline)?;
        self.check_gaps(timeline)
    }

    fn check_item_durations(&self, timeline: &Timeline) -> Result<(), Inconsistency> {
        for (index, item) in timeline.iter().enumerate() {
            let duration = item.duration();
            if duration.is_zero() || duration > self.limits.max_item {
                return Err(Inconsistency::ItemDuration {
                    index,
                    description: item.description.clone(),
                    duration,
                    max: self.limits.max_item,
                });
            }
        }
        Ok(())
    }

    fn check_gaps(&self, timeline: &Timeline) -> Result<(), Inconsistency> {
        for (start, end) in self.idle_stretches(timeline) {
            // Stretches that run backwards (items outside the window) are empty.
            let gap = end.minutes_since(start).unwrap_or(Minutes::ZERO);
            if gap > self.limits.max_gap {
                return Err(Inconsistency::GapTooLarge {
                    start,
                    end,
                    gap,
                    max: self.limits.max_gap,
                });
            }
        }
        Ok(())
    }

    /// Idle stretches in time order.
    fn idle_stretches(&self, timeline: &Timeline) -> Vec<(TimeOfDay, TimeOfDay)> {
        let items = timeline.items();
        let mut stretches = Vec::with_capacity(items.len() + 1);

        let edges = self.window.map(|(day_start, day_end)| match (items.first(), items.last()) {
            (Some(first), Some(last)) => (
                Some((day_start, first.start.min(day_end))),
                Some((last.end.max(day_start), day_end)),
            ),
            _ => (Some((day_start, day_end)), None),
        });
        let (leading, trailing) = edges.unwrap_or((None, None));

        stretches.extend(leading);
        stretches.extend(
            items
                .windows(2)
                .filter_map(|pair| match pair {
                    [current, next] => Some((current.end, next.start)),
                    _ => None,
                }),
        );
        stretches.extend(trailing);
        stretches
    }
}

fn check_event_count(timeline: &Timeline, events: &EventSet) -> Result<(), Inconsistency> {
    let found = timeline.events().count();
    if found != events.len() {
        return Err(Inconsistency::EventCount {
            expected: events.len(),
            found,
        });
    }
    Ok(())
}

fn check_events_match(timeline: &Timeline, events: &EventSet) -> Result<(), Inconsistency> {
    let event_items = timeline
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_event());
    for ((index, item), event) in event_items.zip(events) {
        let matches = item.start == event.start()
            && item.end == event.end()
            && item.description == event.description();
        if !matches {
            return Err(Inconsistency::EventMismatch {
                index,
                expected: format!(
                    "{} {}-{}",
                    event.description(),
                    event.start(),
                    event.end()
                ),
                found: format!("{} {}-{}", item.description, item.start, item.end),
            });
        }
    }
    Ok(())
}

fn check_no_overlap(timeline: &Timeline) -> Result<(), Inconsistency> {
    for (index, pair) in timeline.items().windows(2).enumerate() {
        let [current, next] = pair else { continue };
        if current.end > next.start {
            return Err(Inconsistency::Overlap {
                index,
                first: current.description.clone(),
                second: next.description.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::time::TimeOfDay;
    use crate::timeline::{ItemKind, TimelineItem};

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn event(start: &str, end: &str, name: &str) -> Event {
        Event::new(t(start), t(end), name).unwrap()
    }

    fn task(start: &str, end: &str, name: &str) -> TimelineItem {
        TimelineItem {
            kind: ItemKind::Task,
            start: t(start),
            end: t(end),
            description: name.to_string(),
            location: None,
        }
    }

    fn standup_day() -> (Timeline, EventSet) {
        let standup = event("09:00", "09:30", "Standup");
        let timeline = Timeline::from(vec![
            task("08:30", "09:00", "Write report (part 1)"),
            TimelineItem::from_event(&standup),
            task("09:30", "10:00", "Write report (part 2)"),
        ]);
        (timeline, EventSet::new(vec![standup]))
    }

    #[test]
    fn accepts_a_consistent_timeline() {
        let (timeline, events) = standup_day();
        assert_eq!(Validator::default().validate(&timeline, &events), Ok(()));
    }

    #[test]
    fn validating_twice_gives_the_same_answer() {
        let (timeline, events) = standup_day();
        let validator = Validator::default();
        assert!(validator.validate(&timeline, &events).is_ok());
        assert!(validator.validate(&timeline, &events).is_ok());
    }

    #[test]
    fn rejects_a_missing_event() {
        let (timeline, _) = standup_day();
        let events = EventSet::new(vec![
            event("09:00", "09:30", "Standup"),
            event("11:00", "12:00", "Planning"),
        ]);
        assert_eq!(
            Validator::default().validate(&timeline, &events),
            Err(Inconsistency::EventCount {
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn rejects_a_modified_event() {
        let (timeline, _) = standup_day();
        let events = EventSet::new(vec![event("09:00", "09:45", "Standup")]);
        let err = Validator::default().validate(&timeline, &events).unwrap_err();
        assert!(matches!(err, Inconsistency::EventMismatch { index: 1, .. }));
    }

    #[test]
    fn rejects_overlapping_items() {
        let timeline = Timeline::from(vec![
            task("08:00", "09:10", "Long"),
            task("09:00", "09:30", "Next"),
        ]);
        let err = Validator::default()
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert_eq!(
            err,
            Inconsistency::Overlap {
                index: 0,
                first: "Long".to_string(),
                second: "Next".to_string(),
            }
        );
        assert_eq!(err.to_string(), "items 0 (Long) and 1 (Next) overlap");
    }

    #[test]
    fn rejects_zero_length_items_including_the_last() {
        let timeline = Timeline::from(vec![
            task("08:00", "09:00", "Fine"),
            task("09:00", "09:00", "Empty"),
        ]);
        let err = Validator::default()
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert!(matches!(err, Inconsistency::ItemDuration { index: 1, .. }));
    }

    #[test]
    fn rejects_items_longer_than_the_limit() {
        let timeline = Timeline::from(vec![task("08:00", "12:00", "Marathon")]);
        let validator = Validator::new(ValidationLimits {
            max_item: Minutes::new(120),
            ..ValidationLimits::default()
        });
        let err = validator
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Inconsistency::ItemDuration {
                duration,
                ..
            } if duration == Minutes::new(240)
        ));
    }

    #[test]
    fn rejects_oversized_gaps() {
        let timeline = Timeline::from(vec![
            task("08:00", "08:30", "Early"),
            task("13:00", "13:30", "Late"),
        ]);
        let err = Validator::default()
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "gap of 270m from 08:30 to 13:00 exceeds 240m"
        );
    }

    #[test]
    fn gap_tolerance_is_configurable() {
        let timeline = Timeline::from(vec![
            task("08:00", "08:30", "Early"),
            task("09:00", "09:30", "Later"),
        ]);
        let strict = Validator::new(ValidationLimits {
            max_gap: Minutes::new(15),
            ..ValidationLimits::default()
        });
        assert!(matches!(
            strict.validate(&timeline, &EventSet::default()),
            Err(Inconsistency::GapTooLarge { start, .. }) if start == t("08:30")
        ));
        assert!(
            Validator::default()
                .validate(&timeline, &EventSet::default())
                .is_ok()
        );
    }

    #[test]
    fn without_a_window_the_day_edges_are_ignored() {
        let timeline = Timeline::from(vec![task("08:00", "08:30", "Early")]);
        assert!(
            Validator::default()
                .validate(&timeline, &EventSet::default())
                .is_ok()
        );
    }

    #[test]
    fn empty_timeline_is_one_idle_window() {
        let validator = Validator::default().with_window(t("09:00"), t("17:00"));
        assert_eq!(
            validator.validate(&Timeline::new(), &EventSet::default()),
            Err(Inconsistency::GapTooLarge {
                start: t("09:00"),
                end: t("17:00"),
                gap: Minutes::new(480),
                max: Minutes::new(240),
            })
        );

        let short = Validator::default().with_window(t("09:00"), t("12:00"));
        assert!(
            short
                .validate(&Timeline::new(), &EventSet::default())
                .is_ok()
        );
    }

    #[test]
    fn idle_time_after_the_last_item_counts() {
        let standup = event("09:00", "09:30", "Standup");
        let timeline = Timeline::from(vec![TimelineItem::from_event(&standup)]);
        let events = EventSet::new(vec![standup]);
        let validator = Validator::default().with_window(t("08:00"), t("17:00"));

        let err = validator.validate(&timeline, &events).unwrap_err();
        assert_eq!(err.to_string(), "gap of 450m from 09:30 to 17:00 exceeds 240m");
    }

    #[test]
    fn idle_time_before_the_first_item_counts() {
        let timeline = Timeline::from(vec![task("14:00", "17:00", "Afternoon")]);
        let validator = Validator::default().with_window(t("09:00"), t("17:00"));

        let err = validator
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Inconsistency::GapTooLarge { start, end, .. }
                if start == t("09:00") && end == t("14:00")
        ));
    }

    #[test]
    fn items_outside_the_window_leave_no_negative_edges() {
        let timeline = Timeline::from(vec![
            task("07:00", "08:00", "Early"),
            task("08:00", "10:00", "Morning"),
            task("10:00", "11:30", "Late"),
        ]);
        let validator = Validator::default().with_window(t("09:00"), t("11:00"));
        assert!(
            validator
                .validate(&timeline, &EventSet::default())
                .is_ok()
        );
    }

    #[test]
    fn checks_run_in_order() {
        // Both an overlap and an oversized item: the overlap is reported.
        let timeline = Timeline::from(vec![
            task("08:00", "09:30", "A"),
            task("09:00", "09:00", "B"),
        ]);
        let err = Validator::default()
            .validate(&timeline, &EventSet::default())
            .unwrap_err();
        assert!(matches!(err, Inconsistency::Overlap { .. }));
    }
}
