//! The placed, ordered result of a planning run.

use std::fmt;

use serde::Serialize;

use crate::event::Event;
use crate::time::{Minutes, TimeOfDay};

/// Whether a timeline item came from the calendar or from the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Task,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An event or (part of a) task with a concrete place on the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineItem {
    pub kind: ItemKind,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TimelineItem {
    pub fn from_event(event: &Event) -> Self {
        Self {
            kind: ItemKind::Event,
            start: event.start(),
            end: event.end(),
            description: event.description().to_string(),
            location: event.location().map(String::from),
        }
    }

    /// A task placed at `start` for `duration` minutes.
    pub fn task(description: impl Into<String>, start: TimeOfDay, duration: Minutes) -> Self {
        Self {
            kind: ItemKind::Task,
            start,
            end: start + duration,
            description: description.into(),
            location: None,
        }
    }

    /// Length of the item; zero if the item ends before it starts.
    pub fn duration(&self) -> Minutes {
        self.end
            .minutes_since(self.start)
            .unwrap_or(Minutes::ZERO)
    }

    pub const fn is_event(&self) -> bool {
        matches!(self.kind, ItemKind::Event)
    }
}

/// Ordered items for the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    items: Vec<TimelineItem>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: TimelineItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &TimelineItem> {
        self.items.iter().filter(|item| item.is_event())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TimelineItem> {
        self.items.iter().filter(|item| !item.is_event())
    }

    /// Total minutes of placed task time.
    pub fn task_minutes(&self) -> Minutes {
        self.tasks()
            .map(TimelineItem::duration)
            .fold(Minutes::ZERO, |total, minutes| total + minutes)
    }
}

impl From<Vec<TimelineItem>> for Timeline {
    fn from(items: Vec<TimelineItem>) -> Self {
        Self { items }
    }
}

impl Extend<TimelineItem> for Timeline {
    fn extend<I: IntoIterator<Item = TimelineItem>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineItem;
    type IntoIter = std::slice::Iter<'a, TimelineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn task_item_ends_after_its_duration() {
        let item = TimelineItem::task("Write", t("08:30"), Minutes::new(45));
        assert_eq!(item.end, t("09:15"));
        assert_eq!(item.duration(), Minutes::new(45));
        assert!(!item.is_event());
    }

    #[test]
    fn event_item_copies_the_event() {
        let event = Event::new(t("09:00"), t("09:30"), "Standup")
            .unwrap()
            .with_location("Zoom");
        let item = TimelineItem::from_event(&event);
        assert!(item.is_event());
        assert_eq!(item.description, "Standup");
        assert_eq!(item.location.as_deref(), Some("Zoom"));
        assert_eq!(item.duration(), Minutes::new(30));
    }

    #[test]
    fn backwards_item_has_zero_duration() {
        let item = TimelineItem {
            kind: ItemKind::Task,
            start: t("10:00"),
            end: t("09:00"),
            description: "Broken".to_string(),
            location: None,
        };
        assert_eq!(item.duration(), Minutes::ZERO);
    }

    #[test]
    fn timeline_serializes_as_item_list() {
        let timeline = Timeline::from(vec![TimelineItem::task(
            "Inbox",
            t("08:00"),
            Minutes::new(15),
        )]);
        let json = serde_json::to_string(&timeline).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"task","start":"08:00","end":"08:15","description":"Inbox"}]"#
        );
    }

    #[test]
    fn task_minutes_sums_only_tasks() {
        let event = Event::new(t("09:00"), t("10:00"), "Meeting").unwrap();
        let timeline = Timeline::from(vec![
            TimelineItem::task("a", t("08:00"), Minutes::new(60)),
            TimelineItem::from_event(&event),
            TimelineItem::task("b", t("10:00"), Minutes::new(20)),
        ]);
        assert_eq!(timeline.task_minutes(), Minutes::new(80));
        assert_eq!(timeline.events().count(), 1);
    }
}
