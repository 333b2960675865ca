//! Completion counters for the daily dashboard.
//!
//! The server computes these from scratch per request; the client cache
//! patches them incrementally as mutations are applied optimistically.
//! Both paths share this arithmetic so they agree.

use serde::{Deserialize, Serialize};

use crate::todo::Todo;

/// Completed/pending tallies for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub completed: u64,
    pub pending: u64,
}

impl TaskCounts {
    /// Tally a set of completion flags.
    pub fn tally<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        flags.into_iter().fold(Self::default(), |mut counts, done| {
            counts.add(done);
            counts
        })
    }

    pub fn total(&self) -> u64 {
        self.completed + self.pending
    }

    /// Count one more task in the given state.
    pub fn add(&mut self, completed: bool) {
        if completed {
            self.completed += 1;
        } else {
            self.pending += 1;
        }
    }

    /// Stop counting a task that was in the given state.
    pub fn remove(&mut self, completed: bool) {
        if completed {
            self.completed = self.completed.saturating_sub(1);
        } else {
            self.pending = self.pending.saturating_sub(1);
        }
    }

    /// Move a task between counters. No-op when the state is unchanged.
    pub fn transition(&mut self, was_completed: bool, now_completed: bool) {
        if was_completed != now_completed {
            self.remove(was_completed);
            self.add(now_completed);
        }
    }

    /// `completed / (completed + pending) * 100`, or 0 for an empty day.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.completed as f64 / total as f64 * 100.0
        }
    }
}

/// The daily dashboard: one day's todos plus completion counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Todos dated on the dashboard's day, newest first.
    pub todos_for_today: Vec<Todo>,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub progress_percent: f64,
}

impl Dashboard {
    /// Build the dashboard for an already-filtered, already-ordered day.
    pub fn from_todos(todos_for_today: Vec<Todo>) -> Self {
        let counts = TaskCounts::tally(todos_for_today.iter().map(|t| t.is_completed));
        let mut dashboard = Dashboard {
            todos_for_today,
            completed_tasks: 0,
            pending_tasks: 0,
            progress_percent: 0.0,
        };
        dashboard.set_counts(counts);
        dashboard
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            completed: self.completed_tasks,
            pending: self.pending_tasks,
        }
    }

    /// Replace the counters and recompute progress from them.
    pub fn set_counts(&mut self, counts: TaskCounts) {
        self.completed_tasks = counts.completed;
        self.pending_tasks = counts.pending;
        self.progress_percent = counts.progress_percent();
    }
}
