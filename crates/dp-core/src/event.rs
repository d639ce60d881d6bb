//! Fixed calendar events.

use serde::Serialize;

use crate::time::{Minutes, TimeError, TimeOfDay};

/// An immovable busy interval taken from the calendar.
///
/// Events are never split or moved; the planner only fills the time around
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    start: TimeOfDay,
    end: TimeOfDay,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl Event {
    /// Creates an event, rejecting empty or backwards intervals.
    pub fn new(
        start: TimeOfDay,
        end: TimeOfDay,
        description: impl Into<String>,
    ) -> Result<Self, TimeError> {
        if end.minutes_since(start)?.is_zero() {
            return Err(TimeError::EmptyInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            description: description.into(),
            location: None,
        })
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn duration(&self) -> Minutes {
        self.end
            .minutes_since(self.start)
            .unwrap_or(Minutes::ZERO)
    }
}

/// The day's events, sorted by start time.
///
/// Sorting happens once on construction and is stable, so events sharing a
/// start time keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSet {
    events: Vec<Event>,
}

impl EventSet {
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by_key(Event::start);
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for EventSet {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
