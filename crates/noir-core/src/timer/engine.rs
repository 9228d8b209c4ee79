//! Timer engine implementation.
//!
//! The engine is a one-second countdown state machine. It does not own a
//! thread - the host calls `tick()` on a fixed one-second cadence and the
//! engine suspends itself (ticks become no-ops) whenever it is not running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v  (remaining reaches zero)
//!         Idle, mode flipped, remaining = next mode default
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default());
//! engine.start();
//! // Once per second:
//! if let Some(Event::TimerExpired { mode, .. }) = engine.tick() {
//!     // `mode` is the phase that just ended.
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{Durations, Mode};
use crate::events::Event;

/// Width of the window in which a replayed zero crossing of the same phase
/// is treated as a duplicate delivery of the previous expiry.
pub const EXPIRY_GUARD_MS: u64 = 1_000;

/// Marker left in the session when an expiry notification has been emitted.
/// Arming a fresh countdown with `start` drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryGuard {
    /// The phase whose expiry was reported.
    pub mode: Mode,
    /// When the expiry was reported (epoch milliseconds).
    pub at_ms: u64,
}

/// Countdown state as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub mode: Mode,
    pub remaining_secs: u32,
    /// Countdown is armed.
    pub running: bool,
    /// Only meaningful while `running`.
    pub paused: bool,
    #[serde(default)]
    pub expiry_guard: Option<ExpiryGuard>,
}

impl Session {
    fn idle(mode: Mode, remaining_secs: u32) -> Self {
        Self {
            mode,
            remaining_secs,
            running: false,
            paused: false,
            expiry_guard: None,
        }
    }

    /// True when a tick would decrement the countdown.
    pub fn is_counting(&self) -> bool {
        self.running && !self.paused
    }
}

/// The operations the task binder needs from the countdown when the current
/// task changes.
pub trait TimerControl {
    /// Live remaining seconds, but only while the engine is in Focus mode.
    fn focus_remaining(&self) -> Option<u32>;

    /// Configured Focus length.
    fn focus_default(&self) -> u32;

    /// Disarm the countdown without touching the remaining time.
    fn stop(&mut self);

    /// Load a task's saved Focus progress, or the Focus default when `None`.
    /// Has no effect outside Focus mode.
    fn restore_focus(&mut self, saved_secs: Option<u32>);
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: Durations,
    session: Session,
}

impl TimerEngine {
    /// Create an idle engine in Focus mode with a full countdown.
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            session: Session::idle(Mode::Focus, durations.focus_secs),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.session.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    /// Full length of the current mode.
    pub fn mode_default(&self) -> u32 {
        self.durations.for_mode(self.session.mode)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.mode_default();
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.session.remaining_secs) / f64::from(total))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.session.mode,
            remaining_secs: self.session.remaining_secs,
            total_secs: self.mode_default(),
            running: self.session.running,
            paused: self.session.paused,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.session.is_counting() {
            return None;
        }
        if self.session.running {
            // Armed but paused: start resumes.
            self.session.paused = false;
            return Some(Event::TimerResumed {
                remaining_secs: self.session.remaining_secs,
                at: Utc::now(),
            });
        }
        if self.session.remaining_secs == 0 {
            self.session.remaining_secs = self.mode_default();
        }
        // A fresh countdown means the next zero crossing is a new expiry.
        self.session.expiry_guard = None;
        self.session.running = true;
        self.session.paused = false;
        tracing::debug!(
            mode = ?self.session.mode,
            remaining_secs = self.session.remaining_secs,
            "timer started"
        );
        Some(Event::TimerStarted {
            mode: self.session.mode,
            remaining_secs: self.session.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Single Start/Pause control: flips `paused` while running, starts otherwise.
    pub fn pause_toggle(&mut self) -> Option<Event> {
        if !self.session.running {
            return self.start();
        }
        self.session.paused = !self.session.paused;
        let remaining_secs = self.session.remaining_secs;
        if self.session.paused {
            tracing::debug!(remaining_secs, "timer paused");
            Some(Event::TimerPaused {
                remaining_secs,
                at: Utc::now(),
            })
        } else {
            tracing::debug!(remaining_secs, "timer resumed");
            Some(Event::TimerResumed {
                remaining_secs,
                at: Utc::now(),
            })
        }
    }

    /// Select a phase, disarm the countdown, and load that phase's default.
    pub fn switch_mode(&mut self, mode: Mode) -> Option<Event> {
        self.session = Session::idle(mode, self.durations.for_mode(mode));
        tracing::debug!(?mode, "mode switched");
        Some(Event::ModeSwitched {
            mode,
            remaining_secs: self.session.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        let mode = self.session.mode;
        self.session = Session::idle(mode, self.durations.for_mode(mode));
        Some(Event::TimerReset {
            mode,
            remaining_secs: self.session.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Advance one second using the wall clock for the expiry guard.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Advance one second at `now_ms` (epoch milliseconds).
    ///
    /// Returns `TimerTicked` for a counted second, `TimerExpired` carrying the
    /// phase that just ended on the zero crossing, and `None` while suspended.
    /// A crossing of the phase already reported within [`EXPIRY_GUARD_MS`]
    /// (a replayed advance) still flips the phase but is not announced.
    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        if let Some(guard) = self.session.expiry_guard {
            if now_ms.saturating_sub(guard.at_ms) >= EXPIRY_GUARD_MS {
                self.session.expiry_guard = None;
            }
        }

        if !self.session.is_counting() {
            return None;
        }

        if self.session.remaining_secs > 1 {
            self.session.remaining_secs -= 1;
            return Some(Event::TimerTicked {
                mode: self.session.mode,
                remaining_secs: self.session.remaining_secs,
                at: Utc::now(),
            });
        }

        let ended = self.session.mode;
        // Guards past the window were dropped above.
        let duplicate = matches!(self.session.expiry_guard, Some(guard) if guard.mode == ended);
        self.session.running = false;
        self.session.paused = false;
        self.session.mode = ended.next();
        self.session.remaining_secs = self.durations.for_mode(self.session.mode);

        if duplicate {
            tracing::debug!(?ended, "expiry inside guard window, not re-announced");
            return None;
        }

        self.session.expiry_guard = Some(ExpiryGuard {
            mode: ended,
            at_ms: now_ms,
        });
        tracing::info!(?ended, next = ?self.session.mode, "timer expired");
        Some(Event::TimerExpired {
            mode: ended,
            next_mode: self.session.mode,
            at: Utc::now(),
        })
    }

    /// Replace the configured durations and reset the current phase.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations;
        self.reset();
    }

    /// Load a remaining value directly, used at startup before anything ran.
    /// Clamped into `1..=mode_default()`.
    pub fn set_remaining(&mut self, secs: u32) {
        self.session.remaining_secs = secs.clamp(1, self.mode_default());
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

impl TimerControl for TimerEngine {
    fn focus_remaining(&self) -> Option<u32> {
        (self.session.mode == Mode::Focus).then_some(self.session.remaining_secs)
    }

    fn focus_default(&self) -> u32 {
        self.durations.focus_secs
    }

    fn stop(&mut self) {
        self.session.running = false;
        self.session.paused = false;
    }

    fn restore_focus(&mut self, saved_secs: Option<u32>) {
        if self.session.mode != Mode::Focus {
            return;
        }
        match saved_secs.filter(|s| *s > 0) {
            Some(secs) => self.set_remaining(secs),
            None => self.session.remaining_secs = self.durations.focus_secs,
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
