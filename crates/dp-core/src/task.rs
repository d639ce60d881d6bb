//! Flexible work items and the pool they are scheduled from.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::time::Minutes;

/// Identity of a task inside a [`TaskPool`].
///
/// Assigned when the task enters the pool. The remainder of a split task
/// inherits the id of the task it was split from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A flexible piece of work with optional duration, due date and priority.
///
/// A task has no start or end of its own. Placement lives only on the
/// [`TimelineItem`](crate::TimelineItem) the allocator creates, so a task in
/// the pool is always unplaced and a placed piece never returns to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    /// Part number once the task has been split across gaps.
    #[serde(skip_serializing_if = "Option::is_none")]
    part: Option<u32>,
    duration: Option<Minutes>,
    due_date: Option<NaiveDate>,
    priority: Option<i32>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: TaskId::default(),
            title: description.into(),
            part: None,
            duration: None,
            due_date: None,
            priority: None,
        }
    }

    /// Sets a known duration. Zero counts as unknown.
    #[must_use]
    pub fn with_duration(mut self, duration: Minutes) -> Self {
        self.set_duration(duration);
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// The title with its part suffix, e.g. `Write report (part 2)`.
    pub fn description(&self) -> String {
        match self.part {
            Some(part) => format!("{} (part {part})", self.title),
            None => self.title.clone(),
        }
    }

    /// The title without any part suffix.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn part(&self) -> Option<u32> {
        self.part
    }

    pub const fn duration(&self) -> Option<Minutes> {
        self.duration
    }

    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub const fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub(crate) fn set_duration(&mut self, duration: Minutes) {
        self.duration = (!duration.is_zero()).then_some(duration);
    }

    /// Splits off the first `head` minutes.
    ///
    /// Returns `(head, rest)`: `head` carries the current part number
    /// (`part 1` for a task never split before) and lasts `head` minutes;
    /// `rest` keeps this task's id, takes the next part number and holds the
    /// leftover duration. Gives the task back unchanged unless
    /// `0 < head < duration`.
    pub fn split(self, head: Minutes) -> Result<(Self, Self), Self> {
        let Some(duration) = self.duration else {
            return Err(self);
        };
        if head.is_zero() || head >= duration {
            return Err(self);
        }
        let part = self.part.unwrap_or(1);
        let rest = Self {
            part: Some(part + 1),
            duration: Some(duration.saturating_sub(head)),
            ..self.clone()
        };
        let head = Self {
            part: Some(part),
            duration: Some(head),
            ..self
        };
        Ok((head, rest))
    }

    /// Scheduling order: ascending priority, then ascending due date, with
    /// unset values after every set one.
    pub fn scheduling_cmp(&self, other: &Self) -> Ordering {
        let key = |task: &Self| {
            (
                task.priority.is_none(),
                task.priority,
                task.due_date.is_none(),
                task.due_date,
            )
        };
        key(self).cmp(&key(other))
    }
}

/// The tasks still waiting to be placed, in scheduling order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPool {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task at the end of the pool, assigning it a fresh id.
    pub fn push(&mut self, mut task: Task) -> TaskId {
        self.next_id += 1;
        task.id = TaskId(self.next_id);
        let id = task.id;
        self.tasks.push(task);
        id
    }

    /// Orders the pool by [`Task::scheduling_cmp`].
    ///
    /// The sort is stable: tasks with equal keys keep their insertion order.
    pub fn prioritize(&mut self) {
        self.tasks.sort_by(Task::scheduling_cmp);
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Removes the task with the given id.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Puts `task` where the task with `id` was, keeping the old id.
    ///
    /// Returns the replaced task, or `None` (leaving the pool untouched) if
    /// no task has that id.
    pub fn replace(&mut self, id: TaskId, mut task: Task) -> Option<Task> {
        let index = self.position(id)?;
        task.id = id;
        Some(std::mem::replace(&mut self.tasks[index], task))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn into_vec(self) -> Vec<Task> {
        self.tasks
    }

    /// Total known duration of the pool.
    pub fn known_minutes(&self) -> Minutes {
        self.tasks
            .iter()
            .filter_map(Task::duration)
            .fold(Minutes::ZERO, |total, minutes| total + minutes)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Splits the pool into its tasks and id counter, for rebuilding.
    pub(crate) fn into_parts(self) -> (Vec<Task>, u64) {
        (self.tasks, self.next_id)
    }

    pub(crate) const fn from_parts(tasks: Vec<Task>, next_id: u64) -> Self {
        Self { tasks, next_id }
    }
}

impl FromIterator<Task> for TaskPool {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut pool = Self::new();
        for task in iter {
            pool.push(task);
        }
        pool
    }
}

impl<'a> IntoIterator for &'a TaskPool {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
