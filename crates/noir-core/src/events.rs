use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;
use crate::timer::Mode;

/// Every state change in the core produces an Event.
/// The presentation layer re-renders from them; collaborators react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// One counted second.
    TimerTicked {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. `mode` is the phase that ended.
    TimerExpired {
        mode: Mode,
        next_mode: Mode,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The topmost incomplete task changed.
    CurrentTaskChanged {
        from: Option<TaskId>,
        to: Option<TaskId>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        remaining_secs: u32,
        total_secs: u32,
        running: bool,
        paused: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_internally_tagged() {
        let event = Event::TimerExpired {
            mode: Mode::Focus,
            next_mode: Mode::Rest,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerExpired");
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["next_mode"], "rest");
    }
}
