mod engine;
mod mode;

pub use engine::{ExpiryGuard, Session, TimerControl, TimerEngine, EXPIRY_GUARD_MS};
pub use mode::{Durations, Mode, DEFAULT_FOCUS_SECS, DEFAULT_REST_SECS};
