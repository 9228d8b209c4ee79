//! # Pomodoro Noir Core Library
//!
//! The state machines behind the Pomodoro Noir focus timer. A presentation
//! layer renders the state and forwards user intents; everything here is
//! synchronous and runs on the caller's thread.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A one-second countdown alternating Focus and Rest. The
//!   host calls `tick()` once per second; ticks are no-ops while stopped.
//! - **Task Binder**: The ordered task list. The topmost incomplete task is
//!   the current task and owns the Focus countdown's progress.
//! - **Storage**: TOML configuration and a SQLite key-value store and session
//!   log.
//!
//! ## Key Components
//!
//! - [`Pomodoro`]: Facade wiring the engine, the binder and collaborators
//! - [`TimerEngine`]: Countdown state machine
//! - [`TaskBinder`]: Task list and current-task binding
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod pomodoro;
pub mod storage;
pub mod task;
pub mod telemetry;
pub mod timer;
pub mod title;

pub use error::{ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{DesktopNotifier, ExpiryAlert, Notifier};
pub use pomodoro::Pomodoro;
pub use storage::{Config, Database, KvStore, MemoryStore, Persistence};
pub use task::{CollectionObserver, ProjectList, Task, TaskBinder, TaskDraft, TaskId};
pub use timer::{Durations, Mode, Session, TimerControl, TimerEngine};
pub use title::{format_clock, window_title};
