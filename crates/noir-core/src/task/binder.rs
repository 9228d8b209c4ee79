//! Task list ownership and the current-task binding.
//!
//! The current task is the first task in list order that is not completed.
//! Every mutation of the list ends with a single recomputation of the current
//! task; when it changes, the outgoing task keeps its Focus progress and the
//! incoming task's progress is loaded into the countdown.

use chrono::Utc;
use std::fmt;

use super::{ProjectList, Task, TaskDraft, TaskId};
use crate::events::Event;
use crate::timer::{Mode, TimerControl};

/// Snapshot cadence for in-progress Focus time.
const SNAPSHOT_EVERY_SECS: u32 = 10;

/// Receives the full collection after every change to it.
pub trait CollectionObserver {
    fn tasks_changed(&mut self, tasks: &[Task]);

    fn projects_changed(&mut self, _projects: &[String]) {}
}

pub struct TaskBinder {
    tasks: Vec<Task>,
    projects: ProjectList,
    current: Option<TaskId>,
    draft: TaskDraft,
    observers: Vec<Box<dyn CollectionObserver>>,
}

impl TaskBinder {
    pub fn new() -> Self {
        Self::with_collections(Vec::new(), ProjectList::default())
    }

    /// Build a binder from restored collections. Call [`TaskBinder::startup`]
    /// afterwards to bind the countdown.
    pub fn with_collections(tasks: Vec<Task>, projects: ProjectList) -> Self {
        Self {
            tasks,
            projects,
            current: None,
            draft: TaskDraft::default(),
            observers: Vec::new(),
        }
    }

    pub fn observe(&mut self, observer: Box<dyn CollectionObserver>) {
        self.observers.push(observer);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn projects(&self) -> &ProjectList {
        &self.projects
    }

    pub fn current_task_id(&self) -> Option<&TaskId> {
        self.current.as_ref()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current.as_ref().and_then(|id| self.task(id))
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    // ── Startup ──────────────────────────────────────────────────────

    /// Bind the current task at session start. Nothing was running, so a
    /// saved value is loaded straight into the countdown.
    pub fn startup(&mut self, timer: &mut dyn TimerControl) -> Option<&TaskId> {
        self.current = self.first_incomplete();
        if let Some(saved) = self.current_task().and_then(|t| t.saved_remaining_secs) {
            tracing::debug!(saved, "restoring saved focus progress at startup");
            timer.restore_focus(Some(saved));
        }
        self.current.as_ref()
    }

    // ── Task list mutations ──────────────────────────────────────────

    /// Append a task. Blank text is ignored; an unknown project is dropped.
    pub fn add_task(
        &mut self,
        timer: &mut dyn TimerControl,
        text: &str,
        estimated_cycles: Option<u32>,
        project: Option<&str>,
    ) -> Option<TaskId> {
        let project = match project {
            Some(name) if self.projects.contains(name) => Some(name.to_string()),
            Some(name) => {
                tracing::debug!(project = name, "ignoring unknown project on new task");
                None
            }
            None => None,
        };
        let task = Task::new(text, estimated_cycles, project)?;
        let id = task.id.clone();
        self.tasks.push(task);
        self.recompute_current(timer);
        Some(id)
    }

    /// Add a task from the form. Text and estimate are cleared on success;
    /// the project selection stays for the next entry.
    pub fn submit_draft(&mut self, timer: &mut dyn TimerControl) -> Option<TaskId> {
        let TaskDraft {
            text,
            estimated_cycles,
            project,
        } = self.draft.clone();
        let id = self.add_task(timer, &text, estimated_cycles, project.as_deref())?;
        self.draft.text.clear();
        self.draft.estimated_cycles = None;
        Some(id)
    }

    pub fn toggle_complete(&mut self, timer: &mut dyn TimerControl, id: &TaskId) -> Option<Event> {
        let task = self.tasks.iter_mut().find(|t| &t.id == id)?;
        task.completed = !task.completed;
        self.recompute_current(timer)
    }

    /// Remove a task. Progress of a deleted current task is discarded.
    pub fn delete_task(&mut self, timer: &mut dyn TimerControl, id: &TaskId) -> Option<Event> {
        let index = self.index_of(id)?;
        self.tasks.remove(index);
        self.recompute_current(timer)
    }

    /// Move `id` to immediately precede `before`.
    pub fn reorder(
        &mut self,
        timer: &mut dyn TimerControl,
        id: &TaskId,
        before: &TaskId,
    ) -> Option<Event> {
        if id == before {
            return None;
        }
        let from = self.index_of(id)?;
        self.index_of(before)?;
        let task = self.tasks.remove(from);
        // Re-resolve: the removal may have shifted the target.
        let to = self.index_of(before).unwrap_or(self.tasks.len());
        self.tasks.insert(to, task);
        self.recompute_current(timer)
    }

    // ── Projects ─────────────────────────────────────────────────────

    pub fn add_project(&mut self, name: &str) -> bool {
        if !self.projects.add(name) {
            return false;
        }
        self.notify_projects();
        true
    }

    /// Remove a project. Clears it from the form selection; saved tasks keep
    /// the name.
    pub fn remove_project(&mut self, name: &str) -> bool {
        if !self.projects.remove(name) {
            return false;
        }
        if self.draft.project.as_deref() == Some(name) {
            self.draft.project = None;
        }
        self.notify_projects();
        true
    }

    // ── Timer callbacks ──────────────────────────────────────────────

    /// Snapshot Focus progress into the current task every ten seconds.
    /// Returns whether a snapshot was written.
    pub fn on_timer_tick(&mut self, mode: Mode, remaining_secs: u32, focus_default: u32) -> bool {
        if mode != Mode::Focus
            || remaining_secs % SNAPSHOT_EVERY_SECS != 0
            || remaining_secs == focus_default
        {
            return false;
        }
        let Some(task) = self.current_task_mut() else {
            return false;
        };
        task.saved_remaining_secs = Some(remaining_secs);
        self.notify_tasks();
        true
    }

    /// Credit a completed Focus session to the current task.
    pub fn on_timer_expire(&mut self, mode: Mode) -> bool {
        if mode != Mode::Focus {
            return false;
        }
        let Some(task) = self.current_task_mut() else {
            return false;
        };
        task.finished_cycles = task.finished_cycles.saturating_add(1);
        task.saved_remaining_secs = None;
        tracing::info!(task = %task.id, finished = task.finished_cycles, "focus cycle credited");
        self.notify_tasks();
        true
    }

    // ── Current-task binding ─────────────────────────────────────────

    /// Re-derive the current task, rebind the countdown if it changed and
    /// publish the task list to observers. Every list mutation ends here.
    pub fn recompute_current(&mut self, timer: &mut dyn TimerControl) -> Option<Event> {
        let event = self.rebind(timer);
        self.notify_tasks();
        event
    }

    fn rebind(&mut self, timer: &mut dyn TimerControl) -> Option<Event> {
        let next = self.first_incomplete();
        if next == self.current {
            return None;
        }

        if let Some(live) = timer.focus_remaining() {
            if live > 0 && live != timer.focus_default() {
                if let Some(outgoing) = self.current_task_mut() {
                    outgoing.saved_remaining_secs = Some(live);
                }
            }
        }

        timer.stop();
        let previous = std::mem::replace(&mut self.current, next);

        if let Some(task) = self.current_task() {
            let saved = task.saved_remaining_secs;
            timer.restore_focus(saved);
        }

        tracing::info!(
            from = ?previous.as_ref().map(TaskId::as_str),
            to = ?self.current.as_ref().map(TaskId::as_str),
            "current task changed"
        );
        Some(Event::CurrentTaskChanged {
            from: previous,
            to: self.current.clone(),
            at: Utc::now(),
        })
    }

    fn first_incomplete(&self) -> Option<TaskId> {
        self.tasks.iter().find(|t| !t.completed).map(|t| t.id.clone())
    }

    fn current_task_mut(&mut self) -> Option<&mut Task> {
        let id = self.current.as_ref()?;
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    fn notify_tasks(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.tasks_changed(&self.tasks);
        }
    }

    fn notify_projects(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.projects_changed(self.projects.names());
        }
    }
}

impl Default for TaskBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskBinder")
            .field("tasks", &self.tasks)
            .field("projects", &self.projects)
            .field("current", &self.current)
            .field("draft", &self.draft)
            .field("observers", &self.observers.len())
            .finish()
    }
}
