use serde::{Deserialize, Serialize};

/// Default Focus length in seconds (25 minutes).
pub const DEFAULT_FOCUS_SECS: u32 = 25 * 60;
/// Default Rest length in seconds (5 minutes).
pub const DEFAULT_REST_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Focus,
    Rest,
}

impl Mode {
    /// The phase that follows this one when the countdown expires.
    pub fn next(self) -> Self {
        match self {
            Mode::Focus => Mode::Rest,
            Mode::Rest => Mode::Focus,
        }
    }

    /// Label used by the window title while the countdown is live.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::Rest => "Break",
        }
    }
}

/// Configured length of each phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_secs: u32,
    pub rest_secs: u32,
}

impl Durations {
    /// Build durations from minute values.
    ///
    /// Uses saturating arithmetic and never yields a zero-length phase.
    pub fn from_minutes(focus_min: u32, rest_min: u32) -> Self {
        Self {
            focus_secs: focus_min.saturating_mul(60).max(1),
            rest_secs: rest_min.saturating_mul(60).max(1),
        }
    }

    pub fn for_mode(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_secs,
            Mode::Rest => self.rest_secs,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            rest_secs: DEFAULT_REST_SECS,
        }
    }
}
