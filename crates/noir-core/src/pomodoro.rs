//! The surface a presentation layer drives.
//!
//! `Pomodoro` owns the countdown and the task binder and routes every call
//! between them on one logical thread: ticks feed progress snapshots, expiries
//! credit cycles and raise alerts, and task-list changes rebind the countdown.

use std::rc::Rc;

use crate::error::Result;
use crate::events::Event;
use crate::notify::ExpiryAlert;
use crate::storage::{Config, Database, KvStore, Persistence};
use crate::task::{ProjectList, Task, TaskBinder, TaskDraft, TaskId};
use crate::timer::{Durations, Mode, Session, TimerControl, TimerEngine};
use crate::title;

#[derive(Debug)]
pub struct Pomodoro {
    engine: TimerEngine,
    binder: TaskBinder,
    alert: Option<ExpiryAlert>,
    session_log: Option<Rc<Database>>,
}

impl Pomodoro {
    /// Bind a fresh countdown to `binder`'s current task.
    pub fn new(durations: Durations, mut binder: TaskBinder) -> Self {
        let mut engine = TimerEngine::new(durations);
        binder.startup(&mut engine);
        Self {
            engine,
            binder,
            alert: None,
            session_log: None,
        }
    }

    /// Restore collections from `store` and keep it updated on every change.
    pub fn restore<S: KvStore + 'static>(config: &Config, store: S) -> Self {
        let persistence = Persistence::new(store);
        let mut binder =
            TaskBinder::with_collections(persistence.load_tasks(), persistence.load_projects());
        binder.observe(Box::new(persistence));
        Self::new(config.durations(), binder)
    }

    /// Open the on-disk database and wire desktop alerts from `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let db = Rc::new(Database::open()?);
        Ok(Self::restore(config, Rc::clone(&db))
            .with_alert(ExpiryAlert::desktop(&config.notifications))
            .with_session_log(db))
    }

    pub fn with_alert(mut self, alert: ExpiryAlert) -> Self {
        self.alert = Some(alert);
        self
    }

    pub fn with_session_log(mut self, db: Rc<Database>) -> Self {
        self.session_log = Some(db);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        self.engine.session()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn binder(&self) -> &TaskBinder {
        &self.binder
    }

    pub fn tasks(&self) -> &[Task] {
        self.binder.tasks()
    }

    pub fn projects(&self) -> &ProjectList {
        self.binder.projects()
    }

    pub fn current_task_id(&self) -> Option<&TaskId> {
        self.binder.current_task_id()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.binder.current_task()
    }

    pub fn window_title(&self) -> String {
        title::window_title(self.engine.session())
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    pub fn pause_toggle(&mut self) -> Option<Event> {
        self.engine.pause_toggle()
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.engine.reset()
    }

    /// Switch phase. Entering Focus picks up the current task's saved progress.
    pub fn switch_mode(&mut self, mode: Mode) -> Option<Event> {
        let mut event = self.engine.switch_mode(mode);
        if mode == Mode::Focus {
            self.restore_current_progress();
            if let Some(Event::ModeSwitched { remaining_secs, .. }) = event.as_mut() {
                *remaining_secs = self.engine.remaining_secs();
            }
        }
        event
    }

    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();
        self.dispatch(event)
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        let event = self.engine.tick_at(now_ms);
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: Option<Event>) -> Option<Event> {
        match &event {
            Some(Event::TimerTicked {
                mode,
                remaining_secs,
                ..
            }) => {
                let focus_default = self.engine.focus_default();
                self.binder.on_timer_tick(*mode, *remaining_secs, focus_default);
            }
            Some(Event::TimerExpired {
                mode, next_mode, ..
            }) => {
                let task_id = match mode {
                    Mode::Focus => self.binder.current_task_id().cloned(),
                    Mode::Rest => None,
                };
                self.binder.on_timer_expire(*mode);
                self.log_session(*mode, task_id.as_ref());
                if let Some(alert) = &self.alert {
                    alert.fire(*mode);
                }
                if *next_mode == Mode::Focus {
                    self.restore_current_progress();
                }
            }
            _ => {}
        }
        event
    }

    fn log_session(&self, mode: Mode, task_id: Option<&TaskId>) {
        let Some(db) = &self.session_log else {
            return;
        };
        let duration_secs = self.engine.durations().for_mode(mode);
        if let Err(e) = db.record_session(mode, task_id, duration_secs, chrono::Utc::now()) {
            tracing::warn!(error = %e, "failed to record session");
        }
    }

    fn restore_current_progress(&mut self) {
        if let Some(saved) = self.binder.current_task().and_then(|t| t.saved_remaining_secs) {
            self.engine.restore_focus(Some(saved));
        }
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        text: &str,
        estimated_cycles: Option<u32>,
        project: Option<&str>,
    ) -> Option<TaskId> {
        self.binder
            .add_task(&mut self.engine, text, estimated_cycles, project)
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        self.binder.draft_mut()
    }

    pub fn submit_draft(&mut self) -> Option<TaskId> {
        self.binder.submit_draft(&mut self.engine)
    }

    pub fn toggle_complete(&mut self, id: &TaskId) -> Option<Event> {
        self.binder.toggle_complete(&mut self.engine, id)
    }

    pub fn delete_task(&mut self, id: &TaskId) -> Option<Event> {
        self.binder.delete_task(&mut self.engine, id)
    }

    pub fn reorder(&mut self, id: &TaskId, before: &TaskId) -> Option<Event> {
        self.binder.reorder(&mut self.engine, id, before)
    }

    pub fn add_project(&mut self, name: &str) -> bool {
        self.binder.add_project(name)
    }

    pub fn remove_project(&mut self, name: &str) -> bool {
        self.binder.remove_project(name)
    }
}
