//! Tasks, projects, and the binder that ties the current task to the Focus
//! countdown.

mod binder;
mod project;

pub use binder::{CollectionObserver, TaskBinder};
pub use project::{ProjectList, DEFAULT_PROJECTS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque task identifier, stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A unit of work the Focus countdown can be bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Display label, never blank.
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Planned number of Focus sessions.
    #[serde(default)]
    pub estimated_cycles: Option<u32>,
    /// Focus sessions completed while this task was current.
    #[serde(default)]
    pub finished_cycles: u32,
    /// Project name, not id.
    #[serde(default)]
    pub project: Option<String>,
    /// Focus countdown value in effect when this task was last current.
    #[serde(default)]
    pub saved_remaining_secs: Option<u32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from user input. Returns `None` for blank text.
    pub fn new(text: &str, estimated_cycles: Option<u32>, project: Option<String>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: TaskId::new(),
            text: text.to_string(),
            completed: false,
            estimated_cycles: estimated_cycles.filter(|n| *n > 0),
            finished_cycles: 0,
            project,
            saved_remaining_secs: None,
            created_at: Utc::now(),
        })
    }

    /// `"finished/estimated"`, or just the finished count without an estimate.
    pub fn cycles_label(&self) -> String {
        match self.estimated_cycles {
            Some(estimate) => format!("{}/{}", self.finished_cycles, estimate),
            None => self.finished_cycles.to_string(),
        }
    }

    pub fn has_saved_progress(&self) -> bool {
        self.saved_remaining_secs.is_some()
    }
}

/// State of the add-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub estimated_cycles: Option<u32>,
    /// In-progress project selection.
    pub project: Option<String>,
}
