//! Expiry alerts.
//!
//! Delivery is fire-and-forget: failures are logged and never reach the timer.

use std::io::Write;
use std::process::Command;

use crate::error::NotifyError;
use crate::storage::NotificationsConfig;
use crate::timer::Mode;

/// Something that can put a message in front of the user.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// System notifications via `osascript` on macOS and `notify-send` on Linux.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    #[cfg(target_os = "macos")]
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            body.replace('"', "\\\""),
            title.replace('"', "\\\"")
        );
        run("osascript", &["-e", &script])
    }

    #[cfg(target_os = "linux")]
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        run("notify-send", &["--app-name=Pomodoro Noir", title, body])
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

#[allow(dead_code)]
fn run(program: &str, args: &[&str]) -> Result<(), NotifyError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| NotifyError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(NotifyError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
        })
    }
}

/// Title and body announcing the end of `ended`.
pub fn expiry_message(ended: Mode) -> (&'static str, &'static str) {
    match ended {
        Mode::Focus => ("Focus complete", "Time for a break."),
        Mode::Rest => ("Break over", "Back to focus."),
    }
}

/// Consumer of expiry events: optional bell plus a notification.
pub struct ExpiryAlert {
    notifier: Box<dyn Notifier>,
    enabled: bool,
    sound: bool,
}

impl ExpiryAlert {
    pub fn new(notifier: Box<dyn Notifier>, config: &NotificationsConfig) -> Self {
        Self {
            notifier,
            enabled: config.enabled,
            sound: config.sound,
        }
    }

    pub fn desktop(config: &NotificationsConfig) -> Self {
        Self::new(Box::new(DesktopNotifier), config)
    }

    /// Announce the end of `ended`. Never fails.
    pub fn fire(&self, ended: Mode) {
        if !self.enabled {
            return;
        }
        if self.sound {
            let mut stderr = std::io::stderr();
            if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
                tracing::debug!(error = %e, "bell unavailable");
            }
        }
        let (title, body) = expiry_message(ended);
        if let Err(e) = self.notifier.notify(title, body) {
            tracing::warn!(error = %e, "expiry notification failed");
        }
    }
}

impl std::fmt::Debug for ExpiryAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryAlert")
            .field("enabled", &self.enabled)
            .field("sound", &self.sound)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Capture(Rc<RefCell<Vec<String>>>);

    impl Notifier for Capture {
        fn notify(&self, title: &str, _body: &str) -> Result<(), NotifyError> {
            self.0.borrow_mut().push(title.to_string());
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Unsupported)
        }
    }

    fn quiet() -> NotificationsConfig {
        NotificationsConfig {
            enabled: true,
            sound: false,
        }
    }

    #[test]
    fn fire_names_the_ended_phase() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let alert = ExpiryAlert::new(Box::new(Capture(Rc::clone(&seen))), &quiet());
        alert.fire(Mode::Focus);
        alert.fire(Mode::Rest);
        assert_eq!(*seen.borrow(), ["Focus complete", "Break over"]);
    }

    #[test]
    fn disabled_alert_stays_silent() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let config = NotificationsConfig {
            enabled: false,
            sound: true,
        };
        let alert = ExpiryAlert::new(Box::new(Capture(Rc::clone(&seen))), &config);
        alert.fire(Mode::Focus);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn failing_notifier_is_swallowed() {
        let alert = ExpiryAlert::new(Box::new(Failing), &quiet());
        alert.fire(Mode::Focus);
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let err = run("noir-definitely-not-a-real-binary", &[]).unwrap_err();
        assert!(matches!(err, NotifyError::Spawn { .. }));
    }
}
