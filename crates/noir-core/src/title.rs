//! Status text projected from the session for the window title.

use crate::timer::Session;

/// `mm:ss`, zero padded, minutes unbounded.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `"<mm:ss> - Focus"`, `"- Break"`, `"- Paused"` or `"- Idle"`.
pub fn window_title(session: &Session) -> String {
    let state = if !session.running {
        "Idle"
    } else if session.paused {
        "Paused"
    } else {
        session.mode.label()
    };
    format!("{} - {}", format_clock(session.remaining_secs), state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Durations, Mode, TimerEngine};

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(1500), "25:00");
    }

    #[test]
    fn clock_minutes_exceed_an_hour() {
        assert_eq!(format_clock(100 * 60 + 9), "100:09");
    }

    #[test]
    fn title_tracks_state() {
        let mut engine = TimerEngine::new(Durations::default());
        assert_eq!(window_title(engine.session()), "25:00 - Idle");

        engine.start();
        engine.tick_at(0);
        assert_eq!(window_title(engine.session()), "24:59 - Focus");

        engine.pause_toggle();
        assert_eq!(window_title(engine.session()), "24:59 - Paused");

        engine.switch_mode(Mode::Rest);
        engine.start();
        assert_eq!(window_title(engine.session()), "05:00 - Break");
    }
}
